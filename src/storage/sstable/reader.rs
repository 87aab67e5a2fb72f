//! SSTable Reader
//!
//! Opens SSTable files and looks keys up by scanning them front to back.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::codec::RecordDecoder;
use crate::error::Result;

use super::iterator::SSTableIterator;

/// Reader for a single SSTable file
pub struct SSTableReader {
    /// Path the reader was opened from
    path: PathBuf,
    /// File handle for reading entries
    file: BufReader<File>,
    /// File size at open time
    file_size: u64,
}

impl SSTableReader {
    /// Open an SSTable for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: BufReader::new(file),
            file_size,
        })
    }

    /// Get a value by key — O(n) linear scan
    ///
    /// Values of non-matching records are skipped, not read into memory.
    ///
    /// Returns:
    /// - `Ok(Some(value))` — key found
    /// - `Ok(None)` — key not in this SSTable
    /// - `Err(_)` — the file could not be read or is malformed
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut decoder = RecordDecoder::new(&mut self.file);

        while let Some(current) = decoder.next_key()? {
            if current == key {
                return decoder.read_value().map(Some);
            }
            decoder.skip_value()?;
        }

        Ok(None)
    }

    /// Create an iterator over all entries in key order
    pub fn iter(&mut self) -> Result<SSTableIterator<'_>> {
        SSTableIterator::new(&mut self.file)
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}
