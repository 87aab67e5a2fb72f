//! SSTable Iterator
//!
//! Sequential iteration over all entries in an SSTable.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};

use crate::codec::{Record, RecordDecoder};
use crate::error::Result;

/// Iterator over SSTable entries in sorted key order
pub struct SSTableIterator<'a> {
    decoder: RecordDecoder<&'a mut BufReader<File>>,
    /// Set after the first error so iteration stops there
    failed: bool,
}

impl<'a> SSTableIterator<'a> {
    /// Create a new iterator starting from the first entry
    pub(super) fn new(file: &'a mut BufReader<File>) -> Result<Self> {
        file.seek(SeekFrom::Start(0))?;
        Ok(Self {
            decoder: RecordDecoder::new(file),
            failed: false,
        })
    }
}

impl<'a> Iterator for SSTableIterator<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.decoder.next_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
