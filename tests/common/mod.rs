// not every test binary uses every helper
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crabdb::{
    BPlusTree, BufferPoolManager, DiskManager, GenericKey, IntegerComparator, Rid,
};

pub type IntTree = BPlusTree<8, IntegerComparator>;

static FILE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Build a tree over a fresh data file. Every call gets its own file so
/// tests can run in parallel.
pub fn new_tree(
    pool_size: usize,
    leaf_max_size: usize,
    internal_max_size: usize,
) -> (Arc<BufferPoolManager>, IntTree) {
    crabdb::utils::init_log();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "crabdb_test_{}_{}.db",
        std::process::id(),
        FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_file(&path);

    let bpm = Arc::new(BufferPoolManager::new(pool_size, DiskManager::new(path)));
    let tree = BPlusTree::new(
        "test_index",
        Arc::clone(&bpm),
        IntegerComparator,
        leaf_max_size,
        internal_max_size,
    )
    .unwrap();
    (bpm, tree)
}

/// The small tree of the textbook scenarios: integer order, leaf and
/// internal fan-out of 3, pool of 50 frames.
pub fn new_small_tree() -> (Arc<BufferPoolManager>, IntTree) {
    new_tree(50, 3, 3)
}

pub fn key(v: i64) -> GenericKey<8> {
    GenericKey::from_integer(v)
}

pub fn rid(v: i64) -> Rid {
    Rid::from_integer(v)
}

pub fn insert_all(tree: &IntTree, values: impl IntoIterator<Item = i64>) {
    for v in values {
        assert!(tree.insert(&key(v), &rid(v)).unwrap(), "insert of {} failed", v);
    }
}

pub fn remove_all(tree: &IntTree, values: impl IntoIterator<Item = i64>) {
    for v in values {
        tree.remove(&key(v)).unwrap();
    }
}

/// Full scan as plain integers.
pub fn collect_keys(tree: &IntTree) -> Vec<i64> {
    tree.iter().unwrap().map(|(k, _)| k.to_integer()).collect()
}

/// After a top-level operation returns, no latch path may still hold pins,
/// and every frame is exactly one of free, pinned, or evictable.
pub fn assert_all_unpinned(bpm: &BufferPoolManager) {
    assert_eq!(bpm.pinned_frames(), 0, "some frames are still pinned");
    assert_eq!(
        bpm.free_frames() + bpm.replacer_size(),
        bpm.pool_size(),
        "frames leaked out of the free/evictable partition"
    );
}
