//! # chronofact-storage
//!
//! Backing store adapters for the chronofact fact store.
//! `SqliteBackingStore`: single write connection + read pool (WAL mode),
//! forward-only migrations, indexed keyset range scans.
//! `InMemoryBackingStore`: injected, per-instance store for tests and
//! embedded use.

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod sqlite;

pub use memory::InMemoryBackingStore;
pub use sqlite::SqliteBackingStore;

use chronofact_core::StorageError;

/// Helper to convert a rusqlite failure message into a `StorageError`.
pub fn to_storage_err(msg: String) -> StorageError {
    StorageError::SqliteError { message: msg }
}
