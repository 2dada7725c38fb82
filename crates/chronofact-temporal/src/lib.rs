//! # chronofact-temporal
//!
//! Temporal fact store over any `IBackingStore`.
//! Append-only versioned writes, tombstone deletes, keyset-paginated
//! time-range queries, as-of snapshot reconstruction and snapshot diffs.

pub mod engine;
pub mod query;
pub mod snapshot;

pub use engine::FactStore;
