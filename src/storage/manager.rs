//! Storage Manager
//!
//! Manages the set of segments and coordinates reads/writes.
//!
//! ## Responsibilities
//! - Discover existing segments on startup
//! - Search segments newest → oldest for reads
//! - Create new segments from memtable flushes
//! - Track segment ids

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::error::Result;
use crate::StrataError;

use super::{parse_segment_id, segment_file_name, SSTable, SSTableBuilder, SSTableReader};

/// Manages the storage layer
///
/// ## Concurrency:
/// - `segment_ids`: Protected by RwLock; searches copy it and release the
///   lock before touching any file
/// - `next_segment_id`: Atomic counter (lock-free)
/// - All methods use `&self` (no exclusive access needed)
pub struct StorageManager {
    /// Directory where segments are stored
    data_dir: PathBuf,

    /// Known segment ids, ordered newest → oldest (descending)
    segment_ids: RwLock<Vec<u64>>,

    /// Next ID for creating new segments (atomic, lock-free)
    next_segment_id: AtomicU64,
}

impl StorageManager {
    /// Open or create storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Collect ids from every `data-<id>.sst` file
    /// 3. Skip anything else that looks like a segment but doesn't parse
    /// 4. Order by ID descending (newest first)
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)?;

        let mut segment_ids: Vec<u64> = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();

            match parse_segment_id(&name) {
                Some(id) => {
                    tracing::debug!(segment_id = id, "discovered segment");
                    segment_ids.push(id);
                }
                None if name.ends_with(super::sstable::SEGMENT_SUFFIX) => {
                    tracing::warn!(file = %name, "skipping malformed segment file name");
                }
                None => {}
            }
        }

        // Sort newest first (highest ID first)
        segment_ids.sort_unstable_by(|a, b| b.cmp(a));

        // Next ID = max + 1, or 1 if no segments exist
        let next_id = segment_ids.first().map(|&id| id + 1).unwrap_or(1);

        Ok(Self {
            data_dir: path.to_path_buf(),
            segment_ids: RwLock::new(segment_ids),
            next_segment_id: AtomicU64::new(next_id),
        })
    }

    /// Get a value by key (searches all segments newest → oldest)
    ///
    /// The first segment holding the key wins. A segment that is missing
    /// or unreadable is logged and treated as not holding the key.
    pub fn search(&self, key: &[u8]) -> Option<Vec<u8>> {
        // Snapshot so a concurrent flush can't shift the list under us
        let snapshot = self.segment_ids.read().clone();

        for id in snapshot {
            let path = self.segment_path(id);
            match Self::search_segment(&path, key) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => continue,
                Err(StrataError::Io(ref e)) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!(segment_id = id, "segment file missing, skipping");
                }
                Err(e) => {
                    tracing::warn!(segment_id = id, error = %e, "failed to read segment, skipping");
                }
            }
        }

        None
    }

    fn search_segment(path: &Path, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut reader = SSTableReader::open(path)?;
        reader.get(key)
    }

    /// Write sorted entries to a new segment
    ///
    /// The segment becomes visible to `search` only after its file is
    /// completely written. On failure nothing is registered and the
    /// allocated id is simply never used.
    pub fn flush(&self, entries: &[(Vec<u8>, Vec<u8>)]) -> Result<SSTable> {
        if entries.is_empty() {
            return Err(StrataError::Storage(
                "Cannot flush empty MemTable".to_string(),
            ));
        }

        let id = self.next_segment_id.fetch_add(1, Ordering::SeqCst);
        let path = self.segment_path(id);

        let mut builder = SSTableBuilder::new(id, &path)?;
        for (key, value) in entries {
            builder.add(key, value)?;
        }
        let metadata = builder.finish()?;

        // Keep descending order even if flushes ever overlap
        let mut ids = self.segment_ids.write();
        let pos = ids.partition_point(|&existing| existing > id);
        ids.insert(pos, id);

        Ok(metadata)
    }

    /// Get the number of segments
    pub fn segment_count(&self) -> usize {
        self.segment_ids.read().len()
    }

    /// Known segment ids, newest first
    pub fn segment_ids(&self) -> Vec<u64> {
        self.segment_ids.read().clone()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the next segment ID (for testing/debugging)
    pub fn next_segment_id(&self) -> u64 {
        self.next_segment_id.load(Ordering::SeqCst)
    }

    /// File path for the segment with the given id
    pub fn segment_path(&self, id: u64) -> PathBuf {
        self.data_dir.join(segment_file_name(id))
    }
}
