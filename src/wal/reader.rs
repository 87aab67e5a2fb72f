//! WAL Reader
//!
//! Handles reading records from the WAL file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::codec::{Record, RecordDecoder};
use crate::error::Result;

/// Reads records from the WAL file, front to back
pub struct WalReader {
    decoder: RecordDecoder<BufReader<File>>,
    /// Length of the file when it was opened
    file_len: u64,
    /// End offset of the last well-formed record
    valid_len: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            decoder: RecordDecoder::new(BufReader::new(file)),
            file_len,
            valid_len: 0,
        })
    }

    /// Read the next record from the WAL
    ///
    /// `Ok(None)` at a clean end of file. A record cut short by a crash
    /// comes back as `Err(TruncatedRecord)`.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let record = self.decoder.next_record()?;
        if record.is_some() {
            self.valid_len = self.decoder.offset();
        }
        Ok(record)
    }

    /// Visit every well-formed record in file order
    ///
    /// A torn record ends the replay without an error; everything before
    /// it has been visited. Returns the number of records visited.
    pub fn replay<F>(&mut self, mut visit: F) -> Result<u64>
    where
        F: FnMut(Vec<u8>, Vec<u8>),
    {
        let mut visited = 0;
        loop {
            match self.next_record() {
                Ok(Some(Record { key, value })) => {
                    visit(key, value);
                    visited += 1;
                }
                Ok(None) => return Ok(visited),
                Err(e) if e.is_torn_record() => {
                    tracing::warn!(
                        valid_len = self.valid_len,
                        file_len = self.file_len,
                        error = %e,
                        "WAL ends in a torn record, discarding the tail"
                    );
                    return Ok(visited);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Length of the file when it was opened
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// End offset of the last well-formed record read so far
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }
}
