mod fact;
mod key;
mod query;
mod snapshot;

pub use fact::{canonical_timestamp, ColumnDef, Fact, StoredFact};
pub use key::{FactKey, Partition, VersionCursor, VersionPosition};
pub use query::{QueryOptions, QueryResult, QueryScope, TimeWindow};
pub use snapshot::{FactChange, Snapshot, SnapshotDiff};
