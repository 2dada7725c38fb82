//! SQLite implementation of `IBackingStore`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use chronofact_core::config::StorageConfig;
use chronofact_core::{
    ColumnDef, Fact, IBackingStore, Partition, StorageError, StoredFact, TimeWindow,
    VersionCursor,
};

use crate::migrations;
use crate::pool::{ReadPool, WriteConnection};
use crate::queries::fact_ops::{self, NewFactRow, RangeFilter, RawFact};

/// Facts persisted in one SQLite file (WAL mode).
///
/// Holds the single `WriteConnection` (item puts, migrations) and a
/// `ReadPool` (every range scan and point lookup).
pub struct SqliteBackingStore {
    path: PathBuf,
    writer: WriteConnection,
    readers: ReadPool,
}

impl SqliteBackingStore {
    /// Open the database file without provisioning it. A fresh file
    /// reports `is_initialized() == false` until [`Self::initialize`] runs.
    pub fn open(path: impl AsRef<Path>, config: &StorageConfig) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let writer = WriteConnection::open(&path, config.busy_timeout_ms)?;
        let readers = ReadPool::open(&path, config.read_pool_size, config.busy_timeout_ms)?;
        debug!(
            "opened sqlite backing store at {} ({} readers)",
            path.display(),
            readers.size()
        );
        Ok(Self {
            path,
            writer,
            readers,
        })
    }

    /// Open and apply every pending migration.
    pub fn open_initialized(
        path: impl AsRef<Path>,
        config: &StorageConfig,
    ) -> Result<Self, StorageError> {
        let store = Self::open(path, config)?;
        store.initialize()?;
        Ok(store)
    }

    /// Apply pending migrations. Returns how many were applied.
    pub fn initialize(&self) -> Result<u32, StorageError> {
        let applied = self.writer.with_conn(migrations::run_migrations)?;
        if applied > 0 {
            info!("provisioned fact store at {}", self.path.display());
        }
        Ok(applied)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored versions, tombstones included.
    pub fn count(&self) -> Result<u64, StorageError> {
        self.readers.with_conn(fact_ops::count_facts)
    }

    fn scan(&self, filter: RangeFilter<'_>) -> Result<Vec<StoredFact>, StorageError> {
        let raw = self.readers.with_conn(|conn| fact_ops::query_facts(conn, &filter))?;
        raw.into_iter().map(raw_to_stored).collect()
    }
}

impl IBackingStore for SqliteBackingStore {
    fn is_initialized(&self) -> Result<bool, StorageError> {
        let version = self.readers.with_conn(migrations::current_version)?;
        Ok(version >= migrations::LATEST_VERSION)
    }

    fn put_item(&self, fact: &Fact) -> Result<u64, StorageError> {
        let value = fact
            .value
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StorageError::corrupt(format!("encode value of '{}': {e}", fact.id)))?;
        let columns = fact
            .columns
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StorageError::corrupt(format!("encode columns of '{}': {e}", fact.id)))?;

        let row = NewFactRow {
            id: &fact.id,
            namespace: &fact.namespace,
            field_name: &fact.field_name,
            ts_micros: fact.timestamp.timestamp_micros(),
            data_type: &fact.data_type,
            value: value.as_deref(),
            is_deleted: fact.is_deleted,
            columns: columns.as_deref(),
        };

        let seq = self.writer.with_conn(|conn| fact_ops::insert_fact(conn, &row))?;
        Ok(seq as u64)
    }

    fn query_range(
        &self,
        partition: &Partition,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError> {
        let (namespace, field_name) = match partition {
            Partition::Namespace(ns) => (Some(ns.as_str()), None),
            Partition::Field(key) => (Some(key.namespace.as_str()), Some(key.field_name.as_str())),
        };
        self.scan(RangeFilter {
            namespace,
            field_name,
            ..range_filter(window, after, ascending, limit)
        })
    }

    fn list_all(
        &self,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError> {
        self.scan(range_filter(window, after, ascending, limit))
    }

    fn latest_for_id(&self, id: &str) -> Result<Option<StoredFact>, StorageError> {
        let raw = self.readers.with_conn(|conn| fact_ops::latest_for_id(conn, id))?;
        raw.map(raw_to_stored).transpose()
    }

    fn latest_per_key_for_id(&self, id: &str) -> Result<Vec<StoredFact>, StorageError> {
        let raw = self
            .readers
            .with_conn(|conn| fact_ops::latest_per_key_for_id(conn, id))?;
        raw.into_iter().map(raw_to_stored).collect()
    }
}

fn range_filter<'a>(
    window: &TimeWindow,
    after: Option<&VersionCursor>,
    ascending: bool,
    limit: Option<usize>,
) -> RangeFilter<'a> {
    RangeFilter {
        namespace: None,
        field_name: None,
        start_micros: window.start.map(|t| t.timestamp_micros()),
        end_micros: window.end.map(|t| t.timestamp_micros()),
        after: after.map(|c| (c.0.timestamp.timestamp_micros(), c.0.sequence as i64)),
        ascending,
        limit,
    }
}

/// Convert a RawFact to a StoredFact.
fn raw_to_stored(raw: RawFact) -> Result<StoredFact, StorageError> {
    let timestamp: DateTime<Utc> =
        DateTime::from_timestamp_micros(raw.ts_micros).ok_or_else(|| {
            StorageError::corrupt(format!("seq {}: bad ts_micros {}", raw.seq, raw.ts_micros))
        })?;

    let value = raw
        .value
        .as_deref()
        .map(|s| serde_json::from_str::<serde_json::Value>(s))
        .transpose()
        .map_err(|e| StorageError::corrupt(format!("seq {}: value: {e}", raw.seq)))?;

    let columns = raw
        .columns
        .as_deref()
        .map(|s| serde_json::from_str::<Vec<ColumnDef>>(s))
        .transpose()
        .map_err(|e| StorageError::corrupt(format!("seq {}: columns: {e}", raw.seq)))?;

    Ok(StoredFact::new(
        raw.seq as u64,
        Fact {
            id: raw.id,
            timestamp,
            namespace: raw.namespace,
            field_name: raw.field_name,
            data_type: raw.data_type,
            value,
            is_deleted: raw.is_deleted,
            columns,
        },
    ))
}
