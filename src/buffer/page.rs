use std::sync::RwLock;

use crate::types::{PageData, PAGE_SIZE};

/// One buffer frame's page image. The `RwLock` is the page latch: shared for
/// readers, exclusive for writers. Latch a page only while it is pinned;
/// the buffer pool relies on "pin count 0 implies no latch holder" when it
/// evicts a frame.
pub struct Page {
    data: RwLock<PageData>,
}

impl Page {
    pub(crate) fn new() -> Self {
        Self {
            data: RwLock::new([0; PAGE_SIZE]),
        }
    }

    pub fn latch(&self) -> &RwLock<PageData> {
        &self.data
    }
}
