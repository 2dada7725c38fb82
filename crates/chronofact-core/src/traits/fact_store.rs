//! `IFactStore`: the public contract of the temporal fact store.

use chrono::{DateTime, Utc};

use crate::cancellation::CancellationToken;
use crate::errors::ChronoResult;
use crate::models::{Fact, QueryOptions, QueryResult, Snapshot, SnapshotDiff};

/// Temporal fact store.
///
/// Every operation takes a cancellation token; a cancelled operation fails
/// with `ChronoError::Canceled` having performed zero or one complete
/// backing-store call.
#[allow(async_fn_in_trait)]
pub trait IFactStore: Send + Sync {
    // Writes
    async fn put_fact(&self, fact: Fact, cancel: &CancellationToken) -> ChronoResult<()>;
    async fn put_facts(&self, facts: Vec<Fact>, cancel: &CancellationToken) -> ChronoResult<usize>;
    async fn delete_fact(&self, id: &str, cancel: &CancellationToken) -> ChronoResult<Fact>;

    // Point lookup
    async fn get_fact(&self, id: &str, cancel: &CancellationToken) -> ChronoResult<Fact>;

    // Time-ordered queries
    async fn query_by_field(
        &self,
        namespace: &str,
        field_name: &str,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> ChronoResult<QueryResult>;
    async fn query_by_namespace(
        &self,
        namespace: &str,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> ChronoResult<QueryResult>;
    async fn query_by_time_range(
        &self,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> ChronoResult<QueryResult>;

    // Snapshots. An empty namespace means every namespace.
    async fn get_snapshot_at_time(
        &self,
        namespace: &str,
        at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ChronoResult<Snapshot>;
    async fn diff_snapshots(
        &self,
        namespace: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ChronoResult<SnapshotDiff>;
}
