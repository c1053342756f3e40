use std::fmt;

use crate::storage::codec::{get_i32, put_i32};
use crate::types::{PageId, INVALID_PAGE_ID};
use crate::utils::ceil_div;

/// # Binary Layout (common header, 24 bytes)
///
/// - [0-4): page type (0 internal, 1 leaf)
/// - [4-8): lsn (reserved, unused)
/// - [8-12): size (entry count; internal pages count the dummy slot 0)
/// - [12-16): max size
/// - [16-20): parent page id (-1 for the root)
/// - [20-24): page id
const OFFSET_PAGE_TYPE: usize = 0;
const OFFSET_SIZE: usize = 8;
const OFFSET_MAX_SIZE: usize = 12;
const OFFSET_PARENT_PAGE_ID: usize = 16;
const OFFSET_PAGE_ID: usize = 20;

pub const COMMON_HEADER_SIZE: usize = 24;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BTreePageType {
    Internal,
    Leaf,
}

impl fmt::Display for BTreePageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BTreePageType::Internal => write!(f, "INTERNAL"),
            BTreePageType::Leaf => write!(f, "LEAF"),
        }
    }
}

impl fmt::Debug for BTreePageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

pub fn read_page_type(data: &[u8]) -> BTreePageType {
    match get_i32(data, OFFSET_PAGE_TYPE) {
        0 => BTreePageType::Internal,
        1 => BTreePageType::Leaf,
        t => panic!("invalid page type {}", t),
    }
}

/// Whether `data` even holds a b+ tree page. Used where a page id may be
/// stale (a scan racing a merge) and the image must not be trusted.
pub fn looks_like_leaf(data: &[u8]) -> bool {
    get_i32(data, OFFSET_PAGE_TYPE) == 1
}

pub fn read_size(data: &[u8]) -> usize {
    get_i32(data, OFFSET_SIZE) as usize
}

pub fn read_max_size(data: &[u8]) -> usize {
    get_i32(data, OFFSET_MAX_SIZE) as usize
}

pub fn read_parent_page_id(data: &[u8]) -> PageId {
    get_i32(data, OFFSET_PARENT_PAGE_ID)
}

pub fn write_parent_page_id(data: &mut [u8], parent: PageId) {
    put_i32(data, OFFSET_PARENT_PAGE_ID, parent);
}

pub fn read_page_id(data: &[u8]) -> PageId {
    get_i32(data, OFFSET_PAGE_ID)
}

/// The occupancy floor of a page. Root pages have their own floors: a leaf
/// root may shrink to a single entry, an internal root to two children.
pub fn read_min_size(data: &[u8]) -> usize {
    let is_root = read_parent_page_id(data) == INVALID_PAGE_ID;
    match read_page_type(data) {
        BTreePageType::Leaf => {
            if is_root {
                1
            } else {
                ceil_div(read_max_size(data), 2)
            }
        }
        BTreePageType::Internal => {
            if is_root {
                2
            } else {
                ceil_div(read_max_size(data), 2)
            }
        }
    }
}

/// Read access to the shared page header.
pub trait BTreePage {
    fn data(&self) -> &[u8];

    fn get_page_type(&self) -> BTreePageType {
        read_page_type(self.data())
    }

    fn is_leaf(&self) -> bool {
        self.get_page_type() == BTreePageType::Leaf
    }

    fn is_root(&self) -> bool {
        self.get_parent_pid() == INVALID_PAGE_ID
    }

    fn get_size(&self) -> usize {
        read_size(self.data())
    }

    fn get_max_size(&self) -> usize {
        read_max_size(self.data())
    }

    fn get_min_size(&self) -> usize {
        read_min_size(self.data())
    }

    fn get_parent_pid(&self) -> PageId {
        read_parent_page_id(self.data())
    }

    fn get_page_id(&self) -> PageId {
        read_page_id(self.data())
    }
}

/// Write access to the shared page header.
pub trait BTreePageMut: BTreePage {
    fn data_mut(&mut self) -> &mut [u8];

    fn set_page_type(&mut self, page_type: BTreePageType) {
        let v = match page_type {
            BTreePageType::Internal => 0,
            BTreePageType::Leaf => 1,
        };
        put_i32(self.data_mut(), OFFSET_PAGE_TYPE, v);
    }

    fn set_size(&mut self, size: usize) {
        put_i32(self.data_mut(), OFFSET_SIZE, size as i32);
    }

    fn increase_size(&mut self, amount: i32) {
        let size = self.get_size() as i32 + amount;
        assert!(size >= 0);
        self.set_size(size as usize);
    }

    fn set_max_size(&mut self, max_size: usize) {
        put_i32(self.data_mut(), OFFSET_MAX_SIZE, max_size as i32);
    }

    fn set_parent_pid(&mut self, parent: PageId) {
        write_parent_page_id(self.data_mut(), parent);
    }

    fn set_page_id(&mut self, page_id: PageId) {
        put_i32(self.data_mut(), OFFSET_PAGE_ID, page_id);
    }
}
