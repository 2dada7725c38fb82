//! As-of reconstruction: latest version per key at or before `at`,
//! tombstoned keys dropped.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use chronofact_core::{
    canonical_timestamp, CancellationToken, ChronoError, ChronoResult, FactKey, IBackingStore,
    Partition, Snapshot, StoredFact, TimeWindow, VersionCursor,
};

/// Reconstruct the logical table of `namespace` (every namespace when
/// `None`) as of `at`, scanning the adapter in ascending pages of
/// `page_size` items.
pub async fn reconstruct_at<B: IBackingStore + ?Sized>(
    store: &B,
    namespace: Option<&str>,
    at: DateTime<Utc>,
    page_size: usize,
    operation: &str,
    cancel: &CancellationToken,
) -> ChronoResult<Snapshot> {
    let at = canonical_timestamp(at);
    let window = TimeWindow::until(at);
    let partition = namespace.map(|ns| Partition::Namespace(ns.to_string()));
    let page_size = page_size.max(1);

    let mut latest: BTreeMap<FactKey, StoredFact> = BTreeMap::new();
    let mut after: Option<VersionCursor> = None;
    let mut scanned = 0usize;

    loop {
        cancel.check(operation)?;
        let page = match &partition {
            Some(p) => store.query_range(p, &window, after.as_ref(), true, Some(page_size)),
            None => store.list_all(&window, after.as_ref(), true, Some(page_size)),
        }
        .map_err(|e| ChronoError::backing(operation, e))?;

        let page_len = page.len();
        scanned += page_len;
        after = page.last().map(|s| VersionCursor(s.position()));
        reduce_latest(&mut latest, page);

        if page_len < page_size {
            break;
        }
        // Long histories: let other tasks run between pages.
        tokio::task::yield_now().await;
    }

    let mut snapshot = Snapshot::new(namespace.map(str::to_string), at);
    snapshot.entries = latest
        .into_iter()
        .filter(|(_, item)| !item.fact.is_tombstone())
        .map(|(key, item)| (key, item.into_fact()))
        .collect();

    debug!(
        "{operation}: {} as of {} -> {} live keys from {scanned} versions",
        namespace.unwrap_or("<all>"),
        at.to_rfc3339(),
        snapshot.len()
    );
    Ok(snapshot)
}

/// Fold `items` into `latest`, keeping the maximum `VersionPosition` per key.
pub fn reduce_latest(
    latest: &mut BTreeMap<FactKey, StoredFact>,
    items: impl IntoIterator<Item = StoredFact>,
) {
    for item in items {
        match latest.entry(item.fact.key()) {
            Entry::Vacant(slot) => {
                slot.insert(item);
            }
            Entry::Occupied(mut slot) => {
                if item.position() > slot.get().position() {
                    slot.insert(item);
                }
            }
        }
    }
}
