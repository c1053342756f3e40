use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

mod common;

use common::{assert_all_unpinned, collect_keys, key, new_small_tree, new_tree, rid, IntTree};

fn insert_range(tree: &IntTree, range: impl Iterator<Item = i64>) {
    for v in range {
        assert!(tree.insert(&key(v), &rid(v)).unwrap(), "insert of {} failed", v);
    }
}

#[test]
fn test_concurrent_disjoint_inserts() {
    let (bpm, tree) = new_small_tree();
    let tree = Arc::new(tree);

    let mut handles = Vec::new();
    for range in [1..=1000i64, 1001..=2000i64] {
        let tree = Arc::clone(&tree);
        handles.push(thread::spawn(move || insert_range(&tree, range)));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    tree.check_integrity();
    for v in 1..=2000 {
        assert_eq!(tree.get_value(&key(v)).unwrap(), Some(rid(v)), "lost key {}", v);
    }
    assert_eq!(collect_keys(&tree), (1..=2000).collect::<Vec<_>>());
    assert_all_unpinned(&bpm);
}

#[test]
fn test_concurrent_inserts_interleaved_ranges() {
    // threads collide on the same leaves instead of working far apart; the
    // pool leaves room for four writers pinning full paths plus their
    // split reservations
    let (bpm, tree) = new_tree(200, 3, 3);
    let tree = Arc::new(tree);

    let threads = 4;
    let per_thread = 250;
    let mut handles = Vec::new();
    for t in 0..threads {
        let tree = Arc::clone(&tree);
        handles.push(thread::spawn(move || {
            insert_range(&tree, (0..per_thread).map(|i| (i * threads + t) as i64))
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    tree.check_integrity();
    let total = (threads * per_thread) as i64;
    assert_eq!(collect_keys(&tree), (0..total).collect::<Vec<_>>());
    assert_all_unpinned(&bpm);
}

#[test]
fn test_scan_during_inserts() {
    let (bpm, tree) = new_small_tree();
    insert_range(&tree, 1..=100);
    let tree = Arc::new(tree);

    // one thread scans from the start while another inserts strictly larger
    // keys; the scan must never skip a pre-existing key or go backwards
    let writer = {
        let tree = Arc::clone(&tree);
        thread::spawn(move || insert_range(&tree, 101..=200))
    };
    let reader = {
        let tree = Arc::clone(&tree);
        thread::spawn(move || -> Vec<i64> {
            tree.iter().unwrap().map(|(k, _)| k.to_integer()).collect()
        })
    };

    let scanned = reader.join().unwrap();
    writer.join().unwrap();

    let seen: HashSet<i64> = scanned.iter().copied().collect();
    for v in 1..=100 {
        assert!(seen.contains(&v), "scan skipped pre-existing key {}", v);
    }
    for window in scanned.windows(2) {
        assert!(window[0] < window[1], "scan went backwards");
    }

    tree.check_integrity();
    assert_eq!(collect_keys(&tree), (1..=200).collect::<Vec<_>>());
    assert_all_unpinned(&bpm);
}

#[test]
fn test_concurrent_insert_and_delete() {
    let (bpm, tree) = new_tree(200, 3, 3);
    insert_range(&tree, 10_000..=10_100);
    let tree = Arc::new(tree);

    let (sender, receiver) = crossbeam::channel::unbounded::<i64>();

    let mut handles = Vec::new();
    for t in 0..4i64 {
        let tree = Arc::clone(&tree);
        let sender = sender.clone();
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let v = t * 100 + i;
                assert!(tree.insert(&key(v), &rid(v)).unwrap());
                sender.send(v).unwrap();
            }
        }));
    }
    drop(sender);

    let mut deleters = Vec::new();
    for _ in 0..2 {
        let tree = Arc::clone(&tree);
        let receiver = receiver.clone();
        deleters.push(thread::spawn(move || -> Vec<i64> {
            let mut removed = Vec::new();
            for _ in 0..100 {
                let v = receiver.recv().unwrap();
                tree.remove(&key(v)).unwrap();
                removed.push(v);
            }
            removed
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    let mut removed: HashSet<i64> = HashSet::new();
    for deleter in deleters {
        removed.extend(deleter.join().unwrap());
    }
    assert_eq!(removed.len(), 200);

    tree.check_integrity();
    let mut expected: Vec<i64> = (0..400).filter(|v| !removed.contains(v)).collect();
    expected.extend(10_000..=10_100);
    assert_eq!(collect_keys(&tree), expected);
    assert_all_unpinned(&bpm);
}

#[test]
fn test_readers_during_writes() {
    let (bpm, tree) = new_small_tree();
    insert_range(&tree, 1..=100);
    let tree = Arc::new(tree);

    let writer = {
        let tree = Arc::clone(&tree);
        thread::spawn(move || insert_range(&tree, 101..=400))
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let tree = Arc::clone(&tree);
        readers.push(thread::spawn(move || {
            for round in 0..10 {
                for v in 1..=100 {
                    assert_eq!(
                        tree.get_value(&key(v)).unwrap(),
                        Some(rid(v)),
                        "round {}: stable key {} disappeared",
                        round,
                        v
                    );
                }
            }
        }));
    }

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    tree.check_integrity();
    assert_eq!(collect_keys(&tree), (1..=400).collect::<Vec<_>>());
    assert_all_unpinned(&bpm);
}
