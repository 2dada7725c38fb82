//! FactStore: the temporal fact store, implementing IFactStore over any
//! backing store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use chronofact_core::config::QueryConfig;
use chronofact_core::{
    canonical_timestamp, CancellationToken, ChronoError, ChronoResult, Clock, Fact, FactKey,
    IBackingStore, IFactStore, QueryOptions, QueryResult, QueryScope, Snapshot, SnapshotDiff,
    SystemClock,
};

use crate::query::{self, QueryPlan};
use crate::snapshot;

/// The temporal fact store.
///
/// Stateless apart from the injected backing store, so it is `Send + Sync`
/// whenever the store is and can be shared behind an `Arc`. Every version
/// is an independent append; "latest" is decided by `(timestamp, sequence)`.
pub struct FactStore<B> {
    backing: B,
    config: QueryConfig,
    clock: Arc<dyn Clock>,
}

impl<B: IBackingStore> FactStore<B> {
    /// A store with default query limits and the system clock.
    pub fn new(backing: B) -> Self {
        Self::with_config(backing, QueryConfig::default())
    }

    pub fn with_config(backing: B, config: QueryConfig) -> Self {
        info!(
            "fact store ready (max page {}, snapshot page {})",
            config.max_page_size, config.snapshot_scan_page_size
        );
        Self {
            backing,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used to stamp tombstones.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Drain every page of a query into one vector.
    pub async fn collect_all(
        &self,
        scope: QueryScope,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> ChronoResult<Vec<Fact>> {
        let mut options = options.clone();
        let mut facts = Vec::new();
        loop {
            let plan = QueryPlan::build(scope.clone(), &options, &self.config)?;
            let page = query::execute(&self.backing, &plan, "collect_all", cancel)?;
            facts.extend(page.facts);
            match page.continuation_token {
                Some(token) => options.continuation_token = Some(token),
                None => break,
            }
        }
        Ok(facts)
    }

    fn ensure_initialized(&self, operation: &str, cancel: &CancellationToken) -> ChronoResult<()> {
        cancel.check(operation)?;
        let ready = self
            .backing
            .is_initialized()
            .map_err(|e| ChronoError::backing(operation, e))?;
        if ready {
            Ok(())
        } else {
            Err(ChronoError::NotInitialized)
        }
    }

    fn append(&self, fact: &Fact, operation: &str, cancel: &CancellationToken) -> ChronoResult<u64> {
        cancel.check(operation)?;
        self.backing
            .put_item(fact)
            .map_err(|e| ChronoError::backing(operation, e))
    }

    fn run_query(
        &self,
        scope: QueryScope,
        options: &QueryOptions,
        operation: &str,
        cancel: &CancellationToken,
    ) -> ChronoResult<QueryResult> {
        let plan = QueryPlan::build(scope, options, &self.config)?;
        query::execute(&self.backing, &plan, operation, cancel)
    }

    async fn snapshot(
        &self,
        namespace: &str,
        at: DateTime<Utc>,
        operation: &str,
        cancel: &CancellationToken,
    ) -> ChronoResult<Snapshot> {
        let scope = (!namespace.is_empty()).then_some(namespace);
        snapshot::reconstruct_at(
            &self.backing,
            scope,
            at,
            self.config.snapshot_scan_page_size,
            operation,
            cancel,
        )
        .await
    }
}

impl<B: IBackingStore> IFactStore for FactStore<B> {
    async fn put_fact(&self, fact: Fact, cancel: &CancellationToken) -> ChronoResult<()> {
        fact.validate()?;
        self.ensure_initialized("put_fact", cancel)?;
        let fact = fact.canonicalized();
        let sequence = self.append(&fact, "put_fact", cancel)?;
        debug!(
            "put_fact: '{}' {} at {} (seq {sequence})",
            fact.id,
            fact.key(),
            fact.timestamp.to_rfc3339()
        );
        Ok(())
    }

    async fn put_facts(&self, facts: Vec<Fact>, cancel: &CancellationToken) -> ChronoResult<usize> {
        for (i, fact) in facts.iter().enumerate() {
            fact.validate().map_err(|e| match e {
                ChronoError::Validation(msg) => ChronoError::Validation(format!("facts[{i}]: {msg}")),
                other => other,
            })?;
        }
        self.ensure_initialized("put_facts", cancel)?;

        let total = facts.len();
        for (i, fact) in facts.into_iter().enumerate() {
            let fact = fact.canonicalized();
            let operation = format!("put_facts[{i}]");
            self.append(&fact, &operation, cancel)?;
        }
        debug!("put_facts: appended {total} facts");
        Ok(total)
    }

    async fn delete_fact(&self, id: &str, cancel: &CancellationToken) -> ChronoResult<Fact> {
        if id.trim().is_empty() {
            return Err(ChronoError::Validation("fact id must not be empty".to_string()));
        }
        self.ensure_initialized("delete_fact", cancel)?;

        cancel.check("delete_fact")?;
        let current = self
            .backing
            .latest_per_key_for_id(id)
            .map_err(|e| ChronoError::backing("delete_fact", e))?
            .into_iter()
            .filter(|stored| !stored.fact.is_tombstone())
            .max_by_key(|stored| stored.position())
            .ok_or_else(|| ChronoError::not_found(id))?;

        let floor = current
            .fact
            .timestamp
            .checked_add_signed(Duration::microseconds(1))
            .ok_or_else(|| {
                ChronoError::Validation(format!(
                    "fact '{id}' at {} has no later representable timestamp",
                    current.fact.timestamp.to_rfc3339()
                ))
            })?;
        let deleted_at = canonical_timestamp(self.clock.now()).max(floor);
        let tombstone = current.fact.tombstone_at(deleted_at);
        let sequence = self.append(&tombstone, "delete_fact", cancel)?;
        debug!(
            "delete_fact: '{id}' {} tombstoned at {} (seq {sequence})",
            tombstone.key(),
            deleted_at.to_rfc3339()
        );
        Ok(tombstone)
    }

    async fn get_fact(&self, id: &str, cancel: &CancellationToken) -> ChronoResult<Fact> {
        if id.trim().is_empty() {
            return Err(ChronoError::Validation("fact id must not be empty".to_string()));
        }
        cancel.check("get_fact")?;
        self.backing
            .latest_for_id(id)
            .map_err(|e| ChronoError::backing("get_fact", e))?
            .map(|stored| stored.into_fact())
            .ok_or_else(|| ChronoError::not_found(id))
    }

    async fn query_by_field(
        &self,
        namespace: &str,
        field_name: &str,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> ChronoResult<QueryResult> {
        let scope = QueryScope::Field(FactKey::new(namespace, field_name));
        self.run_query(scope, options, "query_by_field", cancel)
    }

    async fn query_by_namespace(
        &self,
        namespace: &str,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> ChronoResult<QueryResult> {
        let scope = QueryScope::Namespace(namespace.to_string());
        self.run_query(scope, options, "query_by_namespace", cancel)
    }

    async fn query_by_time_range(
        &self,
        options: &QueryOptions,
        cancel: &CancellationToken,
    ) -> ChronoResult<QueryResult> {
        self.run_query(QueryScope::All, options, "query_by_time_range", cancel)
    }

    async fn get_snapshot_at_time(
        &self,
        namespace: &str,
        at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ChronoResult<Snapshot> {
        self.snapshot(namespace, at, "get_snapshot_at_time", cancel)
            .await
    }

    async fn diff_snapshots(
        &self,
        namespace: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> ChronoResult<SnapshotDiff> {
        let (from, to) = (canonical_timestamp(from), canonical_timestamp(to));
        if from > to {
            return Err(ChronoError::Validation(format!(
                "diff start {} is after end {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        let before = self.snapshot(namespace, from, "diff_snapshots", cancel).await?;
        let after = self.snapshot(namespace, to, "diff_snapshots", cancel).await?;
        let diff = snapshot::diff(&before, &after);
        debug!(
            "diff_snapshots: {} changes between {} and {}",
            diff.change_count(),
            from.to_rfc3339(),
            to.to_rfc3339()
        );
        Ok(diff)
    }
}
