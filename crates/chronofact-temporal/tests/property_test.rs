//! Property tests: pagination and snapshot reduction against a naive model.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use chronofact_core::config::QueryConfig;
use chronofact_core::{CancellationToken, Fact, FactKey, IFactStore, QueryOptions};
use chronofact_storage::InMemoryBackingStore;
use chronofact_temporal::FactStore;

const NAMESPACES: [&str; 2] = ["a", "b"];
const FIELDS: [&str; 3] = ["x", "y", "x#y"];

#[derive(Debug, Clone)]
struct Op {
    ns: usize,
    field: usize,
    secs: i64,
    tombstone: bool,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (0..NAMESPACES.len(), 0..FIELDS.len(), 0i64..20, prop::bool::weighted(0.2)).prop_map(
        |(ns, field, secs, tombstone)| Op {
            ns,
            field,
            secs,
            tombstone,
        },
    )
}

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn to_fact(i: usize, op: &Op) -> Fact {
    let f = Fact::new(
        format!("op-{i}"),
        NAMESPACES[op.ns],
        FIELDS[op.field],
        "int",
        serde_json::json!(i),
        base() + Duration::seconds(op.secs),
    );
    if op.tombstone {
        f.tombstone_at(f.timestamp)
    } else {
        f
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn load(ops: &[Op], snapshot_page: usize) -> FactStore<InMemoryBackingStore> {
    let config = QueryConfig {
        snapshot_scan_page_size: snapshot_page,
        ..QueryConfig::default()
    };
    let store = FactStore::with_config(InMemoryBackingStore::new(), config);
    let facts: Vec<Fact> = ops.iter().enumerate().map(|(i, op)| to_fact(i, op)).collect();
    runtime()
        .block_on(store.put_facts(facts, &CancellationToken::none()))
        .unwrap();
    store
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn paging_matches_sorted_model(
        ops in prop::collection::vec(op_strategy(), 0..40),
        limit in 1usize..8,
        ascending in any::<bool>(),
        ns in 0..NAMESPACES.len(),
        field in 0..FIELDS.len(),
    ) {
        let store = load(&ops, 500);
        let rt = runtime();

        let mut opts = QueryOptions::new().limit(limit);
        opts.sort_ascending = ascending;
        let mut got = Vec::new();
        loop {
            let page = rt
                .block_on(store.query_by_field(NAMESPACES[ns], FIELDS[field], &opts, &CancellationToken::none()))
                .unwrap();
            prop_assert!(page.len() <= limit);
            got.extend(page.facts.into_iter().map(|f| f.id));
            match page.continuation_token {
                Some(token) => opts = opts.continue_from(Some(token)),
                None => break,
            }
        }

        // Insertion index breaks timestamp ties.
        let mut model: Vec<(i64, usize)> = ops
            .iter()
            .enumerate()
            .filter(|(_, op)| op.ns == ns && op.field == field)
            .map(|(i, op)| (op.secs, i))
            .collect();
        model.sort();
        if !ascending {
            model.reverse();
        }
        let expected: Vec<String> = model.into_iter().map(|(_, i)| format!("op-{i}")).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn snapshot_matches_latest_live_model(
        ops in prop::collection::vec(op_strategy(), 0..40),
        at_secs in -1i64..21,
        page in 1usize..6,
        scoped in any::<bool>(),
    ) {
        let store = load(&ops, page);
        let namespace = if scoped { NAMESPACES[0] } else { "" };
        let snap = runtime()
            .block_on(store.get_snapshot_at_time(
                namespace,
                base() + Duration::seconds(at_secs),
                &CancellationToken::none(),
            ))
            .unwrap();

        let mut winners: BTreeMap<FactKey, ((i64, usize), bool)> = BTreeMap::new();
        for (i, op) in ops.iter().enumerate() {
            if op.secs > at_secs || (scoped && op.ns != 0) {
                continue;
            }
            let key = FactKey::new(NAMESPACES[op.ns], FIELDS[op.field]);
            let pos = (op.secs, i);
            let slot = winners.entry(key).or_insert((pos, op.tombstone));
            if pos > slot.0 {
                *slot = (pos, op.tombstone);
            }
        }
        let expected: BTreeMap<FactKey, String> = winners
            .into_iter()
            .filter(|(_, (_, tomb))| !tomb)
            .map(|(k, ((_, i), _))| (k, format!("op-{i}")))
            .collect();
        let got: BTreeMap<FactKey, String> = snap
            .iter()
            .map(|(k, f)| (k.clone(), f.id.clone()))
            .collect();
        prop_assert_eq!(got, expected);
    }
}
