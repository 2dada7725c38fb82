//! # chronofact-core
//!
//! Foundation crate for the chronofact temporal fact store.
//! Defines the Fact model, composite keys, query and snapshot value shapes,
//! errors, config, cancellation, clocks, and the store/adapter traits.
//! Every other crate in the workspace depends on this.

pub mod cancellation;
pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod observability;
pub mod traits;

pub use cancellation::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ChronoConfig;
pub use errors::error_code::ChronoErrorCode;
pub use errors::{ChronoError, ChronoResult, StorageError};
pub use models::{
    canonical_timestamp, ColumnDef, Fact, FactChange, FactKey, Partition, QueryOptions,
    QueryResult, QueryScope, Snapshot, SnapshotDiff, StoredFact, TimeWindow, VersionCursor,
    VersionPosition,
};
pub use traits::{IBackingStore, IFactStore};
