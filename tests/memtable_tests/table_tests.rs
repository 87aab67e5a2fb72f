//! MemTable Tests
//!
//! Tests verify:
//! - Basic put/get operations
//! - Approximate size tracking (overwrites still count)
//! - Sorted snapshots
//! - Clear functionality
//! - Concurrent access patterns

use std::sync::Arc;
use std::thread;

use stratakv::memtable::MemTable;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let memtable = MemTable::new();
    assert_eq!(memtable.entry_count(), 0);
    assert_eq!(memtable.size(), 0);
    assert!(memtable.is_empty());
}

#[test]
fn test_put_and_get() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());

    assert_eq!(memtable.get(b"key1"), Some(b"value1".to_vec()));
}

#[test]
fn test_get_nonexistent_key() {
    let memtable = MemTable::new();
    assert_eq!(memtable.get(b"nonexistent"), None);
}

#[test]
fn test_put_multiple_entries() {
    let memtable = MemTable::new();

    memtable.put(b"key1".to_vec(), b"value1".to_vec());
    memtable.put(b"key2".to_vec(), b"value2".to_vec());
    memtable.put(b"key3".to_vec(), b"value3".to_vec());

    assert_eq!(memtable.entry_count(), 3);
    assert_eq!(memtable.get(b"key2"), Some(b"value2".to_vec()));
}

#[test]
fn test_put_overwrites_existing() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"old".to_vec());
    memtable.put(b"key".to_vec(), b"new".to_vec());

    assert_eq!(memtable.entry_count(), 1);
    assert_eq!(memtable.get(b"key"), Some(b"new".to_vec()));
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_put_returns_running_size() {
    let memtable = MemTable::new();

    assert_eq!(memtable.put(b"ab".to_vec(), b"cde".to_vec()), 5);
    assert_eq!(memtable.put(b"f".to_vec(), b"".to_vec()), 6);
    assert_eq!(memtable.size(), 6);
}

#[test]
fn test_size_counts_overwrites() {
    let memtable = MemTable::new();

    memtable.put(b"key".to_vec(), b"value".to_vec()); // 8
    memtable.put(b"key".to_vec(), b"v".to_vec()); // +4, old value not subtracted

    assert_eq!(memtable.size(), 12);
    assert_eq!(memtable.entry_count(), 1);
}

#[test]
fn test_should_flush_is_strictly_greater() {
    let memtable = MemTable::new();
    memtable.put(b"12345".to_vec(), b"67890".to_vec()); // 10

    assert!(!memtable.should_flush(10));
    assert!(memtable.should_flush(9));
}

// =============================================================================
// Snapshot Tests
// =============================================================================

#[test]
fn test_snapshot_is_sorted_by_key() {
    let memtable = MemTable::new();

    memtable.put(b"charlie".to_vec(), b"3".to_vec());
    memtable.put(b"alpha".to_vec(), b"1".to_vec());
    memtable.put(b"bravo".to_vec(), b"2".to_vec());

    let keys: Vec<Vec<u8>> = memtable.snapshot().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec![b"alpha".to_vec(), b"bravo".to_vec(), b"charlie".to_vec()]
    );
}

#[test]
fn test_snapshot_holds_latest_value() {
    let memtable = MemTable::new();

    memtable.put(b"k".to_vec(), b"first".to_vec());
    memtable.put(b"k".to_vec(), b"second".to_vec());

    assert_eq!(memtable.snapshot(), vec![(b"k".to_vec(), b"second".to_vec())]);
}

#[test]
fn test_snapshot_is_detached_from_table() {
    let memtable = MemTable::new();
    memtable.put(b"k".to_vec(), b"v".to_vec());

    let snapshot = memtable.snapshot();
    memtable.clear();

    assert_eq!(snapshot.len(), 1);
    assert!(memtable.is_empty());
}

// =============================================================================
// Clear Tests
// =============================================================================

#[test]
fn test_clear_resets_everything() {
    let memtable = MemTable::new();
    for i in 0..100 {
        memtable.put(format!("key{}", i).into_bytes(), b"value".to_vec());
    }

    memtable.clear();

    assert!(memtable.is_empty());
    assert_eq!(memtable.size(), 0);
    assert_eq!(memtable.get(b"key1"), None);
}

#[test]
fn test_reuse_after_clear() {
    let memtable = MemTable::new();
    memtable.put(b"a".to_vec(), b"1".to_vec());
    memtable.clear();
    memtable.put(b"b".to_vec(), b"22".to_vec());

    assert_eq!(memtable.size(), 3);
    assert_eq!(memtable.get(b"a"), None);
    assert_eq!(memtable.get(b"b"), Some(b"22".to_vec()));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_readers_with_single_writer() {
    let memtable = Arc::new(MemTable::new());
    for i in 0..100 {
        memtable.put(format!("key{:03}", i).into_bytes(), format!("v{}", i).into_bytes());
    }

    let writer = {
        let memtable = Arc::clone(&memtable);
        thread::spawn(move || {
            for i in 100..200 {
                memtable.put(format!("key{:03}", i).into_bytes(), format!("v{}", i).into_bytes());
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let memtable = Arc::clone(&memtable);
            thread::spawn(move || {
                for i in 0..100 {
                    let expected = format!("v{}", i).into_bytes();
                    assert_eq!(memtable.get(format!("key{:03}", i).as_bytes()), Some(expected));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(memtable.entry_count(), 200);
}

#[test]
fn test_concurrent_puts_account_every_byte() {
    let memtable = Arc::new(MemTable::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let memtable = Arc::clone(&memtable);
            thread::spawn(move || {
                for i in 0..50 {
                    // 4-byte key + 4-byte value
                    memtable.put(format!("{}:{:02}", t, i).into_bytes(), b"four".to_vec());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(memtable.entry_count(), 400);
    assert_eq!(memtable.size(), 400 * 8);
}
