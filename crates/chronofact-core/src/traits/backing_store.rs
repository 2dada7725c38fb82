//! `IBackingStore`: partition/sort-key oriented durable storage.
//!
//! Items are stored facts; the sort key is [`VersionPosition`]. Every read
//! is bounded by a partition or a time window so an implementation can
//! serve it from an index. Implementations own encoding and connection
//! pooling and nothing else.

use std::sync::Arc;

use crate::errors::StorageError;
use crate::models::{Fact, Partition, StoredFact, TimeWindow, VersionCursor};

/// Durable storage consumed by the fact store.
///
/// Range reads return items ordered by `(timestamp, sequence)` in the
/// requested direction, restricted to `window`, strictly beyond `after`
/// when given, and at most `limit` long.
pub trait IBackingStore: Send + Sync {
    /// False until the store has been provisioned.
    fn is_initialized(&self) -> Result<bool, StorageError>;

    /// Append one item atomically. Returns the insertion sequence assigned
    /// to it, strictly greater than every sequence assigned before.
    fn put_item(&self, fact: &Fact) -> Result<u64, StorageError>;

    /// Ordered range read within one partition.
    fn query_range(
        &self,
        partition: &Partition,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError>;

    /// Ordered range read across every partition.
    fn list_all(
        &self,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError>;

    /// Latest item (by position) carrying `id`, in any partition.
    fn latest_for_id(&self, id: &str) -> Result<Option<StoredFact>, StorageError>;

    /// For every `(namespace, field_name)` holding a version of `id`, the
    /// latest such version. Ascending position order.
    fn latest_per_key_for_id(&self, id: &str) -> Result<Vec<StoredFact>, StorageError>;
}

// ─── Arc blanket impl ───────────────────────────────────────────────

impl<T: IBackingStore + ?Sized> IBackingStore for Arc<T> {
    fn is_initialized(&self) -> Result<bool, StorageError> {
        (**self).is_initialized()
    }
    fn put_item(&self, fact: &Fact) -> Result<u64, StorageError> {
        (**self).put_item(fact)
    }
    fn query_range(
        &self,
        partition: &Partition,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError> {
        (**self).query_range(partition, window, after, ascending, limit)
    }
    fn list_all(
        &self,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError> {
        (**self).list_all(window, after, ascending, limit)
    }
    fn latest_for_id(&self, id: &str) -> Result<Option<StoredFact>, StorageError> {
        (**self).latest_for_id(id)
    }
    fn latest_per_key_for_id(&self, id: &str) -> Result<Vec<StoredFact>, StorageError> {
        (**self).latest_per_key_for_id(id)
    }
}
