//! MemTable Module
//!
//! In-memory data structure for recent writes.
//!
//! ## Responsibilities
//! - Fast reads and writes in memory
//! - Single-writer/multi-reader access pattern
//! - Track approximate size for flush triggers
//! - Ordered snapshot for SSTable creation
//!
//! ## Data Structure Choice
//! BTreeMap wrapped in an RwLock:
//! - Ordered keys (required for SSTable generation)
//! - Readers share the lock, the single writer takes it exclusively

mod table;

pub use table::MemTable;
