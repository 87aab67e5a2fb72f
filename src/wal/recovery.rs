//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.

use std::fs::OpenOptions;
use std::path::Path;

use crate::error::Result;
use super::WalReader;

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records replayed
    pub entries_recovered: u64,

    /// Bytes of torn tail after the last well-formed record
    pub bytes_discarded: u64,

    /// Whether the WAL was truncated (partial writes removed)
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Replay a WAL file into `visit` and repair a torn tail
    ///
    /// This will:
    /// 1. Visit every well-formed record in order
    /// 2. Stop at the first truncated record
    /// 3. Cut the file back to the end of the last well-formed record
    ///
    /// A missing file recovers nothing and is not an error.
    pub fn recover<F>(path: &Path, visit: F) -> Result<RecoveryResult>
    where
        F: FnMut(Vec<u8>, Vec<u8>),
    {
        if !path.exists() {
            return Ok(RecoveryResult::default());
        }

        let mut reader = WalReader::open(path)?;
        let entries_recovered = reader.replay(visit)?;
        let valid_len = reader.valid_len();
        let bytes_discarded = reader.file_len() - valid_len;

        let was_truncated = bytes_discarded > 0;
        if was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
        }

        Ok(RecoveryResult {
            entries_recovered,
            bytes_discarded,
            was_truncated,
        })
    }

    /// Inspect a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        if !path.exists() {
            return Ok(RecoveryResult::default());
        }

        let mut reader = WalReader::open(path)?;
        let entries_recovered = reader.replay(|_, _| {})?;
        let bytes_discarded = reader.file_len() - reader.valid_len();

        Ok(RecoveryResult {
            entries_recovered,
            bytes_discarded,
            was_truncated: false,
        })
    }
}
