//! MemTable implementation
//!
//! BTreeMap-based memtable with RwLock for concurrency.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// In-memory table for recent writes
///
/// The size counter is an upper bound, not an exact figure: every `put`
/// adds `key.len() + value.len()`, including puts that overwrite an
/// existing key. It only returns to zero on `clear`.
pub struct MemTable {
    /// Sorted key → value map
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    /// Sum of key and value lengths of every put since the last clear
    size: AtomicU64,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            size: AtomicU64::new(0),
        }
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    /// Put a key-value pair (write lock)
    ///
    /// Last write for a key wins. Returns the size counter after the put.
    pub fn put(&self, key: Vec<u8>, value: Vec<u8>) -> u64 {
        let added = (key.len() + value.len()) as u64;

        let mut data = self.data.write();
        data.insert(key, value);
        self.size.fetch_add(added, Ordering::SeqCst) + added
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::SeqCst)
    }

    /// Get the number of distinct keys
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the table holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Check if the size counter has passed the flush threshold
    pub fn should_flush(&self, size_limit: u64) -> bool {
        self.size() > size_limit
    }

    /// Copy out all entries in sorted key order (for flush)
    pub fn snapshot(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.data
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Clear all entries and reset the size counter
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.clear();
        self.size.store(0, Ordering::SeqCst);
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
