use std::ops::{Deref, DerefMut};

use bit_vec::BitVec;

use crate::storage::codec::{get_i32, put_i32};
use crate::types::{PageData, PageId};

/// # Binary Layout
///
/// - [0-8): record slot bitmap, one bit per slot, true means occupied
/// - from 8: records of 36 bytes: 32-byte index name (zero padded) +
///   4-byte root page id
///
/// The header page always lives at page id 0 and maps index names to their
/// root pages, so several indices can share one data file and find their
/// roots again after a restart. A zeroed page is a valid empty registry.
pub const HEADER_SLOT_COUNT: usize = 64;

const BITMAP_SIZE: usize = HEADER_SLOT_COUNT / 8;
const NAME_SIZE: usize = 32;
const RECORD_SIZE: usize = NAME_SIZE + 4;

fn record_offset(slot: usize) -> usize {
    BITMAP_SIZE + slot * RECORD_SIZE
}

pub struct HeaderPage<D> {
    data: D,
}

impl<D: Deref<Target = PageData>> HeaderPage<D> {
    pub fn new(data: D) -> Self {
        Self { data }
    }

    fn bitmap(&self) -> BitVec {
        BitVec::from_bytes(&self.data[..BITMAP_SIZE])
    }

    fn slot_name(&self, slot: usize) -> &[u8] {
        let off = record_offset(slot);
        &self.data[off..off + NAME_SIZE]
    }

    fn find_record(&self, name: &str) -> Option<usize> {
        let mut padded = [0u8; NAME_SIZE];
        padded[..name.len()].copy_from_slice(name.as_bytes());

        let bitmap = self.bitmap();
        (0..HEADER_SLOT_COUNT)
            .filter(|&slot| bitmap[slot])
            .find(|&slot| self.slot_name(slot) == &padded[..])
    }

    pub fn get_root_id(&self, name: &str) -> Option<PageId> {
        assert!(name.len() <= NAME_SIZE, "index name too long");
        let slot = self.find_record(name)?;
        Some(get_i32(&self.data[..], record_offset(slot) + NAME_SIZE))
    }

    pub fn records_count(&self) -> usize {
        self.bitmap().iter().filter(|&b| b).count()
    }
}

impl<D: DerefMut<Target = PageData>> HeaderPage<D> {
    fn set_slot_used(&mut self, slot: usize, used: bool) {
        let mut bitmap = self.bitmap();
        bitmap.set(slot, used);
        self.data[..BITMAP_SIZE].copy_from_slice(&bitmap.to_bytes());
    }

    /// Register a new index. Fails when the name is taken or every slot is
    /// occupied.
    pub fn insert_record(&mut self, name: &str, root_id: PageId) -> bool {
        assert!(name.len() <= NAME_SIZE, "index name too long");
        if self.find_record(name).is_some() {
            return false;
        }

        let bitmap = self.bitmap();
        let Some(slot) = (0..HEADER_SLOT_COUNT).find(|&slot| !bitmap[slot]) else {
            return false;
        };

        let off = record_offset(slot);
        self.data[off..off + NAME_SIZE].fill(0);
        self.data[off..off + name.len()].copy_from_slice(name.as_bytes());
        put_i32(&mut self.data[..], off + NAME_SIZE, root_id);
        self.set_slot_used(slot, true);
        true
    }

    /// Point an existing record at a new root. Fails when the name is
    /// unknown.
    pub fn update_record(&mut self, name: &str, root_id: PageId) -> bool {
        assert!(name.len() <= NAME_SIZE, "index name too long");
        let Some(slot) = self.find_record(name) else {
            return false;
        };
        put_i32(&mut self.data[..], record_offset(slot) + NAME_SIZE, root_id);
        true
    }

    pub fn delete_record(&mut self, name: &str) -> bool {
        assert!(name.len() <= NAME_SIZE, "index name too long");
        let Some(slot) = self.find_record(name) else {
            return false;
        };
        self.set_slot_used(slot, false);
        true
    }
}
