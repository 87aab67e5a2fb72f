//! Record codec
//!
//! The one on-disk record format, shared by the WAL and by SSTable files.
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬───────────┬──────────────┬─────────────┐
//! │ KeyLen (4)   │ Key       │ ValLen (4)   │ Value       │
//! │ i32 BE       │ KeyLen B  │ i32 BE       │ ValLen B    │
//! └──────────────┴───────────┴──────────────┴─────────────┘
//! ```
//!
//! Records are concatenated back to back with no delimiter and no checksum.
//! A stream that ends exactly on a record boundary is a clean end; a stream
//! that ends anywhere inside a record is a truncated record.

use std::io::{self, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, StrataError};

/// Size of each length prefix in bytes
pub const LEN_PREFIX_SIZE: usize = 4;

/// A decoded key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Number of bytes `encode` produces for this pair
pub fn encoded_len(key: &[u8], value: &[u8]) -> usize {
    2 * LEN_PREFIX_SIZE + key.len() + value.len()
}

/// Encode a single record
pub fn encode(key: &[u8], value: &[u8]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(encoded_len(key, value));
    encode_into(&mut buf, key, value)?;
    Ok(buf.freeze())
}

/// Append the encoding of a record to `buf`
///
/// Fails if either field is too long for an `i32` length prefix.
pub fn encode_into(buf: &mut BytesMut, key: &[u8], value: &[u8]) -> Result<()> {
    let key_len = field_len(key, "key")?;
    let value_len = field_len(value, "value")?;

    buf.reserve(encoded_len(key, value));
    buf.put_i32(key_len);
    buf.put_slice(key);
    buf.put_i32(value_len);
    buf.put_slice(value);
    Ok(())
}

fn field_len(field: &[u8], what: &str) -> Result<i32> {
    i32::try_from(field.len()).map_err(|_| {
        StrataError::InvalidInput(format!(
            "{} of {} bytes exceeds the record limit of {} bytes",
            what,
            field.len(),
            i32::MAX
        ))
    })
}

// =============================================================================
// Decoding
// =============================================================================

/// Streaming decoder over any byte source
///
/// Tracks the byte offset of everything consumed so callers can report
/// where a torn record starts and how much of the stream was well formed.
pub struct RecordDecoder<R: Read> {
    reader: R,
    /// Bytes consumed so far
    offset: u64,
    /// Offset at which the current record started
    record_start: u64,
}

impl<R: Read> RecordDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            record_start: 0,
        }
    }

    /// Bytes consumed so far
    ///
    /// After `next_record` returns `Ok(_)`, this is the end of the last
    /// well-formed record.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Decode the next full record
    ///
    /// Returns:
    /// - `Ok(Some(record))` — a complete record
    /// - `Ok(None)` — the stream ended exactly on a record boundary
    /// - `Err(TruncatedRecord)` — the stream ended inside a record
    /// - `Err(Corruption)` — a length prefix was negative
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let key = match self.next_key()? {
            Some(key) => key,
            None => return Ok(None),
        };
        let value = self.read_value()?;
        Ok(Some(Record { key, value }))
    }

    /// Decode the key of the next record, leaving the cursor on its value
    ///
    /// Must be followed by `read_value` or `skip_value`.
    pub fn next_key(&mut self) -> Result<Option<Vec<u8>>> {
        self.record_start = self.offset;
        let key_len = match self.read_len(true)? {
            Some(len) => len,
            None => return Ok(None),
        };
        self.read_field(key_len).map(Some)
    }

    /// Read the value that follows the key returned by `next_key`
    pub fn read_value(&mut self) -> Result<Vec<u8>> {
        let value_len = self.require_len()?;
        self.read_field(value_len)
    }

    /// Consume the value that follows the key without keeping it
    pub fn skip_value(&mut self) -> Result<()> {
        let value_len = self.require_len()?;
        let skipped = io::copy(&mut (&mut self.reader).take(value_len), &mut io::sink())?;
        self.offset += skipped;
        if skipped < value_len {
            return Err(self.truncated());
        }
        Ok(())
    }

    fn require_len(&mut self) -> Result<u64> {
        match self.read_len(false)? {
            Some(len) => Ok(len),
            None => Err(self.truncated()),
        }
    }

    /// Read a 4-byte length prefix
    ///
    /// `Ok(None)` only when no byte at all was available and the caller
    /// is at a record boundary.
    fn read_len(&mut self, at_boundary: bool) -> Result<Option<u64>> {
        let mut prefix = [0u8; LEN_PREFIX_SIZE];
        let mut filled = 0;
        while filled < LEN_PREFIX_SIZE {
            match self.reader.read(&mut prefix[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;

        if filled == 0 && at_boundary {
            return Ok(None);
        }
        if filled < LEN_PREFIX_SIZE {
            return Err(self.truncated());
        }

        let len = i32::from_be_bytes(prefix);
        if len < 0 {
            return Err(StrataError::Corruption(format!(
                "negative length prefix {} in record at offset {}",
                len, self.record_start
            )));
        }
        Ok(Some(len as u64))
    }

    /// Read exactly `len` bytes without trusting `len` for the allocation
    fn read_field(&mut self, len: u64) -> Result<Vec<u8>> {
        let mut field = Vec::new();
        let read = (&mut self.reader).take(len).read_to_end(&mut field)?;
        self.offset += read as u64;
        if (read as u64) < len {
            return Err(self.truncated());
        }
        Ok(field)
    }

    fn truncated(&self) -> StrataError {
        StrataError::TruncatedRecord {
            offset: self.record_start,
        }
    }
}

impl<R: Read> Iterator for RecordDecoder<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
