//! SSTable Module
//!
//! Sorted String Table - immutable on-disk sorted key-value storage.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Data (variable)                                         │
//! │   [KeyLen: i32 BE][Key][ValLen: i32 BE][Value]          │
//! │   ... repeated for each entry, ascending key order ...  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! No header, index or footer: a segment is just the memtable snapshot in
//! the shared record format. Files are written under a temporary name and
//! renamed into place once synced, so a `data-<id>.sst` file is always
//! complete.

mod builder;
mod iterator;
mod reader;

use std::path::PathBuf;

pub use builder::SSTableBuilder;
pub use iterator::SSTableIterator;
pub use reader::SSTableReader;

// =============================================================================
// Segment Naming
// =============================================================================

/// File name prefix for segments
pub(crate) const SEGMENT_PREFIX: &str = "data-";

/// File name suffix for segments
pub(crate) const SEGMENT_SUFFIX: &str = ".sst";

/// Suffix appended while a segment is still being written
pub(crate) const TEMP_SUFFIX: &str = ".tmp";

/// File name for the segment with the given id
/// 42 → "data-42.sst"
pub fn segment_file_name(id: u64) -> String {
    format!("{}{}{}", SEGMENT_PREFIX, id, SEGMENT_SUFFIX)
}

/// Parse a segment id from a file name
/// "data-42.sst" → Some(42)
///
/// Only the canonical decimal form is accepted, so no two file names map
/// to the same id.
pub fn parse_segment_id(file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(SEGMENT_SUFFIX)?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id: u64 = digits.parse().ok()?;
    if id.to_string() != digits {
        return None;
    }
    Some(id)
}

// =============================================================================
// SSTable Metadata
// =============================================================================

/// Metadata for a segment that has just been written
#[derive(Debug, Clone)]
pub struct SSTable {
    /// Segment id (recency order)
    pub id: u64,
    /// Path to the SSTable file
    pub path: PathBuf,
    /// Number of entries in this SSTable
    pub entry_count: u64,
    /// File size in bytes
    pub file_size: u64,
}

impl SSTable {
    /// Get the number of entries
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }
}
