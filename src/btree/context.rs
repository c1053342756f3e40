use std::collections::HashSet;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use crate::buffer::Page;
use crate::types::{PageData, PageId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OpType {
    Read,
    Insert,
    Delete,
}

impl OpType {
    pub fn is_write(&self) -> bool {
        !matches!(self, OpType::Read)
    }
}

/// A held page latch: the guard of the frame's RwLock.
pub enum PageLatch<'a> {
    Read(RwLockReadGuard<'a, PageData>),
    Write(RwLockWriteGuard<'a, PageData>),
}

impl<'a> PageLatch<'a> {
    pub fn data(&self) -> &PageData {
        match self {
            PageLatch::Read(guard) => guard,
            PageLatch::Write(guard) => guard,
        }
    }

    pub fn data_mut(&mut self) -> &mut PageData {
        match self {
            PageLatch::Write(guard) => guard,
            PageLatch::Read(_) => panic!("write access through a read latch"),
        }
    }
}

/// The held root latch. The write guard doubles as the only way to change
/// `root_page_id`.
pub enum RootLatch<'a> {
    Read(RwLockReadGuard<'a, PageId>),
    Write(RwLockWriteGuard<'a, PageId>),
}

/// Everything one tree operation carries while it runs: the crabbed latch
/// path (ancestors that are not yet safe to release, then the current page),
/// pages scheduled for deletion, and pages pre-reserved for splits. Owning
/// the root-latch guard here means nested descent steps can never
/// double-release it.
pub struct OpContext<'a> {
    pub op: OpType,
    pub root: Option<RootLatch<'a>>,
    pub pages: Vec<(PageId, PageLatch<'a>)>,
    pub deleted: HashSet<PageId>,
    pub reserved: Vec<(PageId, &'a Page)>,
}

impl<'a> OpContext<'a> {
    pub fn new(op: OpType) -> Self {
        Self {
            op,
            root: None,
            pages: Vec::new(),
            deleted: HashSet::new(),
            reserved: Vec::new(),
        }
    }

    pub fn root_page_id(&self) -> PageId {
        match self.root.as_ref().expect("root latch not held") {
            RootLatch::Read(guard) => **guard,
            RootLatch::Write(guard) => **guard,
        }
    }

    pub fn set_root_page_id(&mut self, page_id: PageId) {
        match self.root.as_mut().expect("root latch not held") {
            RootLatch::Write(guard) => **guard = page_id,
            RootLatch::Read(_) => panic!("root change under a shared root latch"),
        }
    }

    pub fn release_root(&mut self) {
        self.root = None;
    }

    pub fn push_page(&mut self, page_id: PageId, latch: PageLatch<'a>) {
        self.pages.push((page_id, latch));
    }

    pub fn latch(&self, page_id: PageId) -> Option<&PageLatch<'a>> {
        self.pages
            .iter()
            .find(|(pid, _)| *pid == page_id)
            .map(|(_, latch)| latch)
    }

    pub fn latch_mut(&mut self, page_id: PageId) -> Option<&mut PageLatch<'a>> {
        self.pages
            .iter_mut()
            .find(|(pid, _)| *pid == page_id)
            .map(|(_, latch)| latch)
    }

    pub fn last_latch(&self) -> &PageLatch<'a> {
        &self.pages.last().expect("empty page set").1
    }

    pub fn last_latch_mut(&mut self) -> &mut PageLatch<'a> {
        &mut self.pages.last_mut().expect("empty page set").1
    }

    /// Mutable access to two distinct latched pages at once, for entry moves
    /// between siblings.
    pub fn latch_pair_mut(
        &mut self,
        a: PageId,
        b: PageId,
    ) -> (&mut PageLatch<'a>, &mut PageLatch<'a>) {
        assert_ne!(a, b);
        let pos_a = self.position(a).expect("page not latched");
        let pos_b = self.position(b).expect("page not latched");

        if pos_a < pos_b {
            let (left, right) = self.pages.split_at_mut(pos_b);
            (&mut left[pos_a].1, &mut right[0].1)
        } else {
            let (left, right) = self.pages.split_at_mut(pos_a);
            (&mut right[0].1, &mut left[pos_b].1)
        }
    }

    pub fn take_reserved(&mut self) -> (PageId, &'a Page) {
        self.reserved.pop().expect("no reserved page left")
    }

    fn position(&self, page_id: PageId) -> Option<usize> {
        self.pages.iter().position(|(pid, _)| *pid == page_id)
    }
}
