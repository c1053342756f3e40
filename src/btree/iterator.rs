use std::sync::RwLockReadGuard;

use log::error;

use super::page::{looks_like_leaf, BTreeLeafPage, BTreePage};
use super::tree::BPlusTree;
use crate::storage::key::{GenericKey, KeyComparator, Rid};
use crate::types::{PageData, PageId, INVALID_PAGE_ID};
use crate::utils::HandyRwLock;

/// Forward range scan over the leaf chain. The iterator keeps exactly one
/// leaf read-latched and pinned at a time; stepping off a leaf releases it
/// before the next one is fetched, so a writer waiting for the current leaf
/// gets in as soon as the scan moves on.
pub struct TreeIterator<'a, const N: usize, C: KeyComparator<N>> {
    tree: &'a BPlusTree<N, C>,
    leaf: Option<(PageId, RwLockReadGuard<'a, PageData>)>,
    index: usize,
}

impl<'a, const N: usize, C: KeyComparator<N>> TreeIterator<'a, N, C> {
    pub(crate) fn new(
        tree: &'a BPlusTree<N, C>,
        leaf: Option<(PageId, RwLockReadGuard<'a, PageData>)>,
        index: usize,
    ) -> Self {
        Self { tree, leaf, index }
    }

    pub fn is_end(&self) -> bool {
        match &self.leaf {
            None => true,
            Some((_, guard)) => {
                let leaf = BTreeLeafPage::<_, N>::new(&**guard);
                self.index >= leaf.get_size()
            }
        }
    }

    fn release_current(&mut self) {
        if let Some((page_id, guard)) = self.leaf.take() {
            drop(guard);
            self.tree.bpm().unpin_page(page_id, false);
        }
    }
}

impl<'a, const N: usize, C: KeyComparator<N>> Iterator for TreeIterator<'a, N, C> {
    type Item = (GenericKey<N>, Rid);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next_page_id = {
                let (_, guard) = self.leaf.as_ref()?;
                let leaf = BTreeLeafPage::<_, N>::new(&**guard);
                if self.index < leaf.get_size() {
                    let item = leaf.item(self.index);
                    self.index += 1;
                    return Some(item);
                }
                leaf.get_next_page_id()
            };

            self.release_current();
            if next_page_id == INVALID_PAGE_ID {
                return None;
            }

            let Some(page) = self.tree.bpm().fetch_page(next_page_id) else {
                error!("scan stopped: buffer pool exhausted at page {}", next_page_id);
                return None;
            };
            let guard = page.latch().rl();
            // the chain pointer was read before this latch; the page may
            // have been merged away and recycled in between
            if !looks_like_leaf(&*guard) {
                drop(guard);
                self.tree.bpm().unpin_page(next_page_id, false);
                return None;
            }
            self.leaf = Some((next_page_id, guard));
            self.index = 0;
        }
    }
}

impl<'a, const N: usize, C: KeyComparator<N>> PartialEq for TreeIterator<'a, N, C> {
    fn eq(&self, other: &Self) -> bool {
        let position = |it: &Self| it.leaf.as_ref().map(|(page_id, _)| (*page_id, it.index));
        position(self) == position(other)
    }
}

impl<'a, const N: usize, C: KeyComparator<N>> Drop for TreeIterator<'a, N, C> {
    fn drop(&mut self) {
        self.release_current();
    }
}
