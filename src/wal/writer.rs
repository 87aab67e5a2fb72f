//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::error::Result;

/// Appends records to the WAL file
///
/// Every append is synced to the device before it returns.
pub struct WalWriter {
    /// Path of the log file
    path: PathBuf,
    /// Handle opened in append mode
    file: File,
    /// Current length of the log in bytes
    len: u64,
}

impl WalWriter {
    /// Open or create a WAL file
    ///
    /// Existing contents are kept; new records go after them.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
        })
    }

    /// Append a record and sync it to disk
    ///
    /// Returns the length of the log after the append. On failure the log
    /// is cut back to its previous length so a half-written record cannot
    /// sit in front of later appends.
    pub fn append(&mut self, key: &[u8], value: &[u8]) -> Result<u64> {
        let record = codec::encode(key, value)?;

        let written = self
            .file
            .write_all(&record)
            .and_then(|_| self.file.sync_all());

        if let Err(e) = written {
            if let Err(rollback) = self.file.set_len(self.len) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back partial WAL append"
                );
            }
            return Err(e.into());
        }

        self.len += record.len() as u64;
        Ok(self.len)
    }

    /// Truncate the log to zero length
    ///
    /// Only valid once every record in the log is durable elsewhere.
    pub fn clear(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        // The file is already empty; a later rollback must not regrow it
        self.len = 0;
        self.file.sync_all()?;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Current length of the log in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the log holds no records
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
