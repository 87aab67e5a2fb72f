//! Storage Module
//!
//! Persistent storage layer: immutable sorted segments (SSTables).
//!
//! ## Responsibilities
//! - Persist memtable snapshots to disk in key order
//! - Answer point lookups across all segments, newest first
//! - Rediscover segments on startup
//!
//! Lookups are deliberately unindexed: a search scans each segment front
//! to back until the key turns up. There is no compaction, so segments are
//! never rewritten or removed.
//!
//! ## Directory Layout
//! ```text
//! {data_dir}/
//!   ├── wal.log
//!   ├── data-1.sst
//!   ├── data-2.sst
//!   └── data-3.sst      ← newest, searched first
//! ```

mod sstable;
mod manager;

pub use sstable::{
    parse_segment_id, segment_file_name, SSTable, SSTableBuilder, SSTableIterator, SSTableReader,
};
pub use manager::StorageManager;
