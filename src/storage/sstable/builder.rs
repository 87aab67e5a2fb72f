//! SSTable Builder
//!
//! Writes sorted key-value entries to a new SSTable file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;

use crate::codec;
use crate::error::Result;
use crate::StrataError;

use super::{SSTable, TEMP_SUFFIX};

/// Builder for creating new SSTables from sorted entries
///
/// Entries go to `<path>.tmp`; `finish()` syncs and renames it to `path`.
/// A builder dropped before `finish()` removes its temporary file.
pub struct SSTableBuilder {
    /// Segment id
    id: u64,
    /// Final file path
    path: PathBuf,
    /// Path written to until finish
    tmp_path: PathBuf,
    /// Buffered writer for performance (None once finished)
    writer: Option<BufWriter<File>>,
    /// Reused encode buffer
    scratch: BytesMut,
    /// Number of entries written
    entry_count: u64,
    /// Bytes written so far
    file_size: u64,
}

impl SSTableBuilder {
    /// Create a new SSTable builder for segment `id` at `path`
    pub fn new(id: u64, path: &Path) -> Result<Self> {
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(TEMP_SUFFIX);
        let tmp_path = PathBuf::from(tmp_name);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        Ok(Self {
            id,
            path: path.to_path_buf(),
            tmp_path,
            writer: Some(BufWriter::new(file)),
            scratch: BytesMut::new(),
            entry_count: 0,
            file_size: 0,
        })
    }

    /// Add a key-value pair (must be called in sorted key order)
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| StrataError::Storage("SSTable builder already finished".to_string()))?;

        self.scratch.clear();
        codec::encode_into(&mut self.scratch, key, value)?;
        writer.write_all(&self.scratch)?;

        self.file_size += self.scratch.len() as u64;
        self.entry_count += 1;
        Ok(())
    }

    /// Finish building: sync the data, move it into place and return metadata
    pub fn finish(mut self) -> Result<SSTable> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| StrataError::Storage("SSTable builder already finished".to_string()))?;

        let file = writer.into_inner().map_err(|e| {
            StrataError::Storage(format!("Failed to flush SSTable: {}", e))
        })?;
        file.sync_all()?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path)?;
        if let Err(e) = sync_parent_dir(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to sync directory after SSTable rename"
            );
        }

        Ok(SSTable {
            id: self.id,
            path: self.path.clone(),
            entry_count: self.entry_count,
            file_size: self.file_size,
        })
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }
}

impl Drop for SSTableBuilder {
    fn drop(&mut self) {
        // `writer` is only taken by finish(); anything else is an abandoned build.
        if self.writer.take().is_some() || self.tmp_path.exists() {
            if let Err(e) = fs::remove_file(&self.tmp_path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.tmp_path.display(),
                        error = %e,
                        "failed to remove abandoned SSTable file"
                    );
                }
            }
        }
    }
}

/// Persist the rename itself
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) => File::open(parent)?.sync_all(),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
