//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and Storage
//! - Handle concurrent read/write access
//! - Trigger flushes when MemTable is full
//! - Manage crash recovery on startup

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, StrataError};
use crate::memtable::MemTable;
use crate::protocol::Command;
use crate::storage::StorageManager;
use crate::wal::{WalRecovery, WalWriter};

/// Point-in-time counters reported by [`Engine::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Memtable size counter (approximate, see [`MemTable`])
    pub memtable_size_bytes: u64,
    /// Number of known segments
    pub sstable_count: usize,
}

/// What a command produced, for the request layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Write accepted or ping answered
    Done,
    /// GET hit
    Value(Vec<u8>),
    /// GET miss
    NotFound,
    /// STATS
    Stats(EngineStats),
}

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (set/flush): Serialized by the `wal` mutex, held for the
///   whole sequence WAL append → memtable put → threshold check → flush.
///   The WAL and memtable therefore always change together.
///
/// - **Reads** (get): Never take the write lock
///   - MemTable uses an internal RwLock (many concurrent readers)
///   - StorageManager copies its segment list and reads files with
///     per-call handles
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Write-ahead log; its lock is the write lock
    wal: Mutex<WalWriter>,

    /// In-memory table for recent writes (internal RwLock)
    memtable: MemTable,

    /// Persistent storage manager (internal RwLock on segment ids)
    storage: StorageManager,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";

    /// Open or create an engine with the given config
    ///
    /// On startup (Recovering):
    /// 1. Open/create data directory
    /// 2. Discover existing segments
    /// 3. Replay the WAL into a fresh memtable, cutting off a torn tail
    /// 4. Open the WAL for appending
    ///
    /// The returned engine is Ready.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let storage = StorageManager::open(&config.data_dir)?;
        let memtable = MemTable::new();

        let recovery = WalRecovery::recover(&wal_path, |key, value| {
            memtable.put(key, value);
        })?;

        if recovery.was_truncated {
            tracing::warn!(
                bytes_discarded = recovery.bytes_discarded,
                "discarded incomplete trailing WAL record"
            );
        }

        let wal = WalWriter::open(&wal_path)?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            segments = storage.segment_count(),
            wal_entries = recovery.entries_recovered,
            memtable_bytes = memtable.size(),
            "engine ready"
        );

        Ok(Self {
            config,
            wal: Mutex::new(wal),
            memtable,
            storage,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<CommandOutput> {
        match command {
            Command::Get { key } => Ok(match self.get(&key) {
                Some(value) => CommandOutput::Value(value),
                None => CommandOutput::NotFound,
            }),
            Command::Set { key, value } => {
                self.set(&key, &value)?;
                Ok(CommandOutput::Done)
            }
            Command::Stats => Ok(CommandOutput::Stats(self.stats())),
            Command::Ping => Ok(CommandOutput::Done),
        }
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. Segments (newest to oldest)
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        if let Some(value) = self.memtable.get(key) {
            return Some(value);
        }

        self.storage.search(key)
    }

    /// Set a key-value pair
    ///
    /// Steps:
    /// 1. Reject an empty key
    /// 2. Acquire write lock
    /// 3. Write to WAL and sync (durability)
    /// 4. Write to MemTable (visibility)
    /// 5. Flush if the size counter passed the threshold
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(StrataError::InvalidInput("key must not be empty".to_string()));
        }

        let mut wal = self.wal.lock();

        wal.append(key, value)?;
        self.memtable.put(key.to_vec(), value.to_vec());

        if self.memtable.should_flush(self.config.memtable_size_limit) {
            self.flush_locked(&mut wal)?;
        }

        Ok(())
    }

    /// Flush memtable to disk (public API)
    ///
    /// Forces a flush regardless of memtable size
    pub fn flush(&self) -> Result<()> {
        let mut wal = self.wal.lock();
        self.flush_locked(&mut wal)
    }

    /// Internal flush implementation (called with write lock held)
    ///
    /// The memtable and WAL are cleared only after the segment is on disk.
    /// If the segment write fails both stay as they were, so the data is
    /// still recoverable from the WAL.
    fn flush_locked(&self, wal: &mut WalWriter) -> Result<()> {
        if self.memtable.is_empty() {
            return Ok(());
        }

        let entries = self.memtable.snapshot();
        let bytes = self.memtable.size();

        let sstable = self.storage.flush(&entries).map_err(|e| {
            tracing::error!(error = %e, "memtable flush failed, keeping WAL");
            e
        })?;

        self.memtable.clear();
        wal.clear()?;

        tracing::info!(
            segment_id = sstable.id,
            entries = sstable.entry_count,
            file_size = sstable.file_size,
            memtable_bytes = bytes,
            "flushed memtable to segment"
        );

        Ok(())
    }

    /// Point-in-time counters; may be stale by the time they are read
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            memtable_size_bytes: self.memtable.size(),
            sstable_count: self.storage.segment_count(),
        }
    }

    /// Close the engine
    ///
    /// Syncs the WAL and releases file handles. Unflushed writes stay in
    /// the WAL and are replayed on the next open.
    pub fn close(self) -> Result<()> {
        self.wal.lock().sync()?;
        tracing::info!(data_dir = %self.config.data_dir.display(), "engine closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL file path
    pub fn wal_path(&self) -> PathBuf {
        self.config.data_dir.join(Self::WAL_FILENAME)
    }

    /// Get the current memtable size counter
    pub fn memtable_size(&self) -> u64 {
        self.memtable.size()
    }

    /// Get the memtable entry count
    pub fn memtable_entry_count(&self) -> usize {
        self.memtable.entry_count()
    }

    /// Get the number of segments
    pub fn sstable_count(&self) -> usize {
        self.storage.segment_count()
    }

    /// Get the storage manager
    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
