use std::cmp::Ordering;
use std::convert::TryInto;
use std::fmt;

use crate::storage::codec::{get_i32, get_u32, put_i32, put_u32};
use crate::types::PageId;

/// A fixed-width index key: an `N`-byte string with no interpretation of its
/// own. Ordering comes from the comparator the tree was built with.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct GenericKey<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> GenericKey<N> {
    pub fn new() -> Self {
        Self { data: [0; N] }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut key = Self::new();
        key.data.copy_from_slice(&bytes[..N]);
        key
    }

    /// Widen an integer into the key. The integer occupies the first
    /// `min(N, 8)` bytes, little-endian; the rest stays zero.
    pub fn set_from_integer(&mut self, v: i64) {
        self.data = [0; N];
        let bytes = v.to_le_bytes();
        let n = N.min(8);
        self.data[..n].copy_from_slice(&bytes[..n]);
    }

    pub fn from_integer(v: i64) -> Self {
        let mut key = Self::new();
        key.set_from_integer(v);
        key
    }

    /// The integer a `set_from_integer` key was widened from.
    pub fn to_integer(&self) -> i64 {
        let mut bytes = [0u8; 8];
        let n = N.min(8);
        bytes[..n].copy_from_slice(&self.data[..n]);
        i64::from_le_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> Default for GenericKey<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Display for GenericKey<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_integer())
    }
}

impl<const N: usize> fmt::Debug for GenericKey<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Total order over keys, injected into the tree at construction.
pub trait KeyComparator<const N: usize>: Send + Sync {
    fn compare(&self, lhs: &GenericKey<N>, rhs: &GenericKey<N>) -> Ordering;
}

/// Orders keys by the integer they were widened from.
#[derive(Clone, Copy, Default)]
pub struct IntegerComparator;

impl<const N: usize> KeyComparator<N> for IntegerComparator {
    fn compare(&self, lhs: &GenericKey<N>, rhs: &GenericKey<N>) -> Ordering {
        lhs.to_integer().cmp(&rhs.to_integer())
    }
}

pub const RID_SIZE: usize = 8;

/// A user-level record id: the heap page holding the tuple plus its slot.
/// Opaque to the index, 8 bytes on a leaf page.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rid {
    pub page_id: PageId,
    pub slot_num: u32,
}

impl Rid {
    pub fn new(page_id: PageId, slot_num: u32) -> Self {
        Self { page_id, slot_num }
    }

    /// Pack an integer test key into a rid, page id in the high half.
    pub fn from_integer(v: i64) -> Self {
        Self {
            page_id: (v >> 32) as i32,
            slot_num: v as u32,
        }
    }

    pub fn to_integer(&self) -> i64 {
        ((self.page_id as i64) << 32) | (self.slot_num as i64)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let bytes: &[u8; RID_SIZE] = bytes[..RID_SIZE].try_into().unwrap();
        Self {
            page_id: get_i32(bytes, 0),
            slot_num: get_u32(bytes, 4),
        }
    }

    pub fn to_bytes(&self) -> [u8; RID_SIZE] {
        let mut bytes = [0u8; RID_SIZE];
        put_i32(&mut bytes, 0, self.page_id);
        put_u32(&mut bytes, 4, self.slot_num);
        bytes
    }
}

impl fmt::Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.page_id, self.slot_num)
    }
}

impl fmt::Debug for Rid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_widening() {
        let key = GenericKey::<8>::from_integer(-7);
        assert_eq!(key.to_integer(), -7);

        let mut key = GenericKey::<16>::new();
        key.set_from_integer(1 << 40);
        assert_eq!(key.to_integer(), 1 << 40);
    }

    #[test]
    fn test_integer_comparator() {
        let cmp = IntegerComparator;
        let a = GenericKey::<8>::from_integer(1);
        let b = GenericKey::<8>::from_integer(2);
        assert_eq!(KeyComparator::<8>::compare(&cmp, &a, &b), Ordering::Less);
        assert_eq!(KeyComparator::<8>::compare(&cmp, &b, &a), Ordering::Greater);
        assert_eq!(KeyComparator::<8>::compare(&cmp, &a, &a), Ordering::Equal);
    }

    #[test]
    fn test_rid_roundtrip() {
        let rid = Rid::new(3, 77);
        assert_eq!(Rid::from_bytes(&rid.to_bytes()), rid);
        assert_eq!(Rid::from_integer(rid.to_integer()), rid);
    }
}
