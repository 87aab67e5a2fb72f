//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append every accepted write before it becomes visible in memory
//! - fsync each append before returning
//! - Replay the log into a fresh memtable on startup
//! - Truncate to empty once its contents are durable in a segment
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬───────┬─────────┬─────────┐ │
//! │ │KeyLen(4)│  Key  │ValLen(4)│  Value  │ │
//! │ └─────────┴───────┴─────────┴─────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌─────────┬───────┬─────────┬─────────┐ │
//! │ │KeyLen(4)│  Key  │ValLen(4)│  Value  │ │
//! │ └─────────┴───────┴─────────┴─────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The record layout is the one in [`crate::codec`]. There is no sequence
//! number: file order is write order.

mod writer;
mod reader;
mod recovery;

pub use writer::WalWriter;
pub use reader::WalReader;
pub use recovery::{WalRecovery, RecoveryResult};
