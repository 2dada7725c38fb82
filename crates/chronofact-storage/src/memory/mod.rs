//! In-memory implementation of `IBackingStore`.
//!
//! Each instance owns its items; there is no process-wide registry, so any
//! number of independent stores can coexist. Items are held in a
//! `BTreeMap` keyed by `VersionPosition`, which gives every scan its
//! `(timestamp, sequence)` order for free.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chronofact_core::{
    Fact, FactKey, IBackingStore, Partition, StorageError, StoredFact, TimeWindow, VersionCursor,
    VersionPosition,
};

#[derive(Debug, Default)]
struct Items {
    by_position: BTreeMap<VersionPosition, Fact>,
    last_sequence: u64,
}

/// Volatile backing store.
#[derive(Debug)]
pub struct InMemoryBackingStore {
    items: RwLock<Items>,
    initialized: AtomicBool,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryBackingStore {
    /// An empty, initialized store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Items::default()),
            initialized: AtomicBool::new(true),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// A store that reports itself as not yet provisioned.
    pub fn uninitialized() -> Self {
        let store = Self::new();
        store.initialized.store(false, Ordering::Release);
        store
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::Release);
    }

    /// Make every subsequent `put_item` fail with `StorageError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Make every subsequent read fail with `StorageError::Unavailable`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Release);
    }

    /// Number of stored versions, tombstones included.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .by_position
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_reads(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::Acquire) {
            return Err(StorageError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }

    fn scan<P>(
        &self,
        matches: P,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError>
    where
        P: Fn(&Fact) -> bool,
    {
        self.check_reads()?;
        let items = self
            .items
            .read()
            .map_err(|e| StorageError::Poisoned(format!("in-memory items: {e}")))?;

        let admitted = |(pos, fact): &(&VersionPosition, &Fact)| {
            window.contains(&pos.timestamp)
                && after.map_or(true, |c| c.admits(pos, ascending))
                && matches(fact)
        };
        let to_stored = |(pos, fact): (&VersionPosition, &Fact)| StoredFact::new(pos.sequence, fact.clone());
        let limit = limit.unwrap_or(usize::MAX);

        let page = if ascending {
            items
                .by_position
                .iter()
                .filter(admitted)
                .take(limit)
                .map(to_stored)
                .collect()
        } else {
            items
                .by_position
                .iter()
                .rev()
                .filter(admitted)
                .take(limit)
                .map(to_stored)
                .collect()
        };
        Ok(page)
    }
}

impl Default for InMemoryBackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IBackingStore for InMemoryBackingStore {
    fn is_initialized(&self) -> Result<bool, StorageError> {
        self.check_reads()?;
        Ok(self.initialized.load(Ordering::Acquire))
    }

    fn put_item(&self, fact: &Fact) -> Result<u64, StorageError> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(StorageError::Unavailable("injected write failure".to_string()));
        }
        let mut items = self
            .items
            .write()
            .map_err(|e| StorageError::Poisoned(format!("in-memory items: {e}")))?;
        items.last_sequence += 1;
        let sequence = items.last_sequence;
        items
            .by_position
            .insert(VersionPosition::new(fact.timestamp, sequence), fact.clone());
        Ok(sequence)
    }

    fn query_range(
        &self,
        partition: &Partition,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError> {
        self.scan(|f| partition.matches(f), window, after, ascending, limit)
    }

    fn list_all(
        &self,
        window: &TimeWindow,
        after: Option<&VersionCursor>,
        ascending: bool,
        limit: Option<usize>,
    ) -> Result<Vec<StoredFact>, StorageError> {
        self.scan(|_| true, window, after, ascending, limit)
    }

    fn latest_for_id(&self, id: &str) -> Result<Option<StoredFact>, StorageError> {
        self.check_reads()?;
        let items = self
            .items
            .read()
            .map_err(|e| StorageError::Poisoned(format!("in-memory items: {e}")))?;
        Ok(items
            .by_position
            .iter()
            .rev()
            .find(|(_, f)| f.id == id)
            .map(|(pos, f)| StoredFact::new(pos.sequence, f.clone())))
    }

    fn latest_per_key_for_id(&self, id: &str) -> Result<Vec<StoredFact>, StorageError> {
        self.check_reads()?;
        let items = self
            .items
            .read()
            .map_err(|e| StorageError::Poisoned(format!("in-memory items: {e}")))?;
        let mut latest: HashMap<FactKey, (&VersionPosition, &Fact)> = HashMap::new();
        for (pos, fact) in items.by_position.iter().filter(|(_, f)| f.id == id) {
            latest.insert(fact.key(), (pos, fact));
        }
        let mut versions: Vec<_> = latest.into_values().collect();
        versions.sort_by_key(|(pos, _)| **pos);
        Ok(versions
            .into_iter()
            .map(|(pos, f)| StoredFact::new(pos.sequence, f.clone()))
            .collect())
    }
}
