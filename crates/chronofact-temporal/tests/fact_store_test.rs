//! FactStore write path and point lookups: validation, round trip, tombstone
//! deletes, initialization, cancellation, concurrent writers.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chronofact_core::{
    CancellationToken, ChronoError, ColumnDef, Fact, IFactStore, ManualClock, QueryOptions,
    QueryScope, StorageError,
};
use chronofact_storage::InMemoryBackingStore;
use chronofact_temporal::FactStore;

// ── Harness ──────────────────────────────────────────────────────────────

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn setup() -> FactStore<InMemoryBackingStore> {
    FactStore::new(InMemoryBackingStore::new())
}

fn setup_with_clock(now: DateTime<Utc>) -> (FactStore<InMemoryBackingStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    let store = FactStore::new(InMemoryBackingStore::new()).with_clock(clock.clone());
    (store, clock)
}

fn fact(id: &str, field: &str, at: DateTime<Utc>, v: &str) -> Fact {
    Fact::new(id, "ns", field, "string", serde_json::json!(v), at)
}

fn none() -> CancellationToken {
    CancellationToken::none()
}

// ── Round trip & validation ──────────────────────────────────────────────

#[tokio::test]
async fn put_then_get_round_trips() {
    let store = setup();
    let f = fact("row-1", "x", t0(), "v1").with_columns(vec![ColumnDef {
        name: "x".to_string(),
        data_type: "string".to_string(),
    }]);
    store.put_fact(f.clone(), &none()).await.unwrap();
    assert_eq!(store.get_fact("row-1", &none()).await.unwrap(), f);
}

#[tokio::test]
async fn timestamps_are_truncated_to_microseconds() {
    let store = setup();
    let at = Utc.timestamp_opt(1_717_243_200, 987_654_321).unwrap();
    store.put_fact(fact("ns-1", "x", at, "v"), &none()).await.unwrap();
    let back = store.get_fact("ns-1", &none()).await.unwrap();
    assert_eq!(back.timestamp.timestamp_subsec_nanos(), 987_654_000);
}

#[tokio::test]
async fn invalid_facts_are_rejected_without_writing() {
    let store = setup();

    let mut blank_id = fact("x", "x", t0(), "v");
    blank_id.id = "   ".to_string();
    let mut no_ns = fact("a", "x", t0(), "v");
    no_ns.namespace.clear();
    let mut no_field = fact("b", "x", t0(), "v");
    no_field.field_name.clear();
    let mut loaded_tombstone = fact("c", "x", t0(), "v");
    loaded_tombstone.is_deleted = true;

    for bad in [blank_id, no_ns, no_field, loaded_tombstone] {
        let err = store.put_fact(bad, &none()).await.unwrap_err();
        assert!(matches!(err, ChronoError::Validation(_)), "{err}");
    }
    assert!(store.backing().is_empty());
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let store = setup();
    assert!(matches!(
        store.get_fact("missing", &none()).await,
        Err(ChronoError::NotFound { ref id }) if id == "missing"
    ));
    assert!(matches!(
        store.get_fact("", &none()).await,
        Err(ChronoError::Validation(_))
    ));
}

#[tokio::test]
async fn get_returns_globally_latest_version() {
    let store = setup();
    store.put_fact(fact("row", "x", t0(), "old"), &none()).await.unwrap();
    // Same id, different field, later timestamp.
    store
        .put_fact(fact("row", "y", t0() + Duration::minutes(1), "new"), &none())
        .await
        .unwrap();
    // Earlier write arriving last does not win.
    store
        .put_fact(fact("row", "x", t0() - Duration::minutes(1), "older"), &none())
        .await
        .unwrap();

    let latest = store.get_fact("row", &none()).await.unwrap();
    assert_eq!(latest.field_name, "y");
    assert_eq!(latest.value, Some(serde_json::json!("new")));
}

#[tokio::test]
async fn equal_timestamps_resolve_by_insertion_order() {
    let store = setup();
    store.put_fact(fact("tie", "x", t0(), "first"), &none()).await.unwrap();
    store.put_fact(fact("tie", "x", t0(), "second"), &none()).await.unwrap();
    let latest = store.get_fact("tie", &none()).await.unwrap();
    assert_eq!(latest.value, Some(serde_json::json!("second")));
}

// ── Batch writes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn put_facts_validates_the_whole_batch_first() {
    let store = setup();
    let mut bad = fact("b", "x", t0(), "v");
    bad.namespace.clear();
    let err = store
        .put_facts(vec![fact("a", "x", t0(), "v"), bad], &none())
        .await
        .unwrap_err();
    match err {
        ChronoError::Validation(msg) => assert!(msg.starts_with("facts[1]"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(store.backing().is_empty());

    let n = store
        .put_facts(
            (0..5)
                .map(|i| fact(&format!("r{i}"), "x", t0() + Duration::seconds(i), "v"))
                .collect(),
            &none(),
        )
        .await
        .unwrap();
    assert_eq!(n, 5);
    assert_eq!(store.backing().len(), 5);
}

#[tokio::test]
async fn put_facts_failure_names_the_failing_operation() {
    let store = setup();
    store.backing().set_fail_writes(true);
    let err = store
        .put_facts(vec![fact("a", "x", t0(), "v")], &none())
        .await
        .unwrap_err();
    match err {
        ChronoError::BackingStore { operation, source } => {
            assert_eq!(operation, "put_facts[0]");
            assert!(matches!(source, StorageError::Unavailable(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
}

// ── Deletes ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_appends_a_tombstone() {
    let (store, _clock) = setup_with_clock(t0() + Duration::minutes(5));
    let original = fact("row", "x", t0(), "v1");
    store.put_fact(original.clone(), &none()).await.unwrap();

    let tomb = store.delete_fact("row", &none()).await.unwrap();
    assert!(tomb.is_tombstone());
    assert!(tomb.value.is_none());
    assert_eq!(tomb.key(), original.key());
    assert_eq!(tomb.data_type, original.data_type);
    assert_eq!(tomb.timestamp, t0() + Duration::minutes(5));

    // History is kept; the tombstone is now the latest version.
    assert_eq!(store.backing().len(), 2);
    assert_eq!(store.get_fact("row", &none()).await.unwrap(), tomb);
}

#[tokio::test]
async fn delete_is_stamped_after_a_future_dated_version() {
    let (store, _clock) = setup_with_clock(t0());
    let future = t0() + Duration::days(1);
    store.put_fact(fact("row", "x", future, "v"), &none()).await.unwrap();

    let tomb = store.delete_fact("row", &none()).await.unwrap();
    assert_eq!(tomb.timestamp, future + Duration::microseconds(1));
}

#[tokio::test]
async fn delete_of_missing_or_deleted_id_is_not_found() {
    let (store, clock) = setup_with_clock(t0() + Duration::minutes(1));
    assert!(matches!(
        store.delete_fact("ghost", &none()).await,
        Err(ChronoError::NotFound { .. })
    ));

    store.put_fact(fact("row", "x", t0(), "v"), &none()).await.unwrap();
    store.delete_fact("row", &none()).await.unwrap();
    clock.advance(Duration::minutes(1));
    assert!(matches!(
        store.delete_fact("row", &none()).await,
        Err(ChronoError::NotFound { .. })
    ));
    assert_eq!(store.backing().len(), 2);
}

#[tokio::test]
async fn rewrite_after_delete_revives_the_id() {
    let (store, _clock) = setup_with_clock(t0() + Duration::minutes(1));
    store.put_fact(fact("row", "x", t0(), "v1"), &none()).await.unwrap();
    store.delete_fact("row", &none()).await.unwrap();
    store
        .put_fact(fact("row", "x", t0() + Duration::minutes(2), "v2"), &none())
        .await
        .unwrap();
    let latest = store.get_fact("row", &none()).await.unwrap();
    assert!(!latest.is_tombstone());
    assert_eq!(latest.value, Some(serde_json::json!("v2")));
}

#[tokio::test]
async fn delete_reaches_live_versions_under_other_keys() {
    let (store, _clock) = setup_with_clock(t0() + Duration::minutes(10));
    let in_a = Fact::new("row", "nsA", "x", "string", serde_json::json!("a"), t0());
    let in_b = Fact::new(
        "row",
        "nsB",
        "y",
        "string",
        serde_json::json!("b"),
        t0() + Duration::minutes(1),
    );
    store.put_fact(in_a.clone(), &none()).await.unwrap();
    store.put_fact(in_b.clone(), &none()).await.unwrap();

    let first = store.delete_fact("row", &none()).await.unwrap();
    assert_eq!(first.key(), in_b.key());

    // nsB/y is now a tombstone, but nsA/x still holds a live version.
    let second = store.delete_fact("row", &none()).await.unwrap();
    assert_eq!(second.key(), in_a.key());
    assert!(second.is_tombstone());

    assert!(matches!(
        store.delete_fact("row", &none()).await,
        Err(ChronoError::NotFound { .. })
    ));
    let later = t0() + Duration::hours(1);
    let snap_a = store.get_snapshot_at_time("nsA", later, &none()).await.unwrap();
    assert!(snap_a.field("x").is_none());
    assert_eq!(store.backing().len(), 4);
}

#[tokio::test]
async fn delete_at_the_last_representable_instant_is_rejected() {
    let (store, _clock) = setup_with_clock(t0());
    store
        .put_fact(fact("edge", "x", DateTime::<Utc>::MAX_UTC, "v"), &none())
        .await
        .unwrap();

    let err = store.delete_fact("edge", &none()).await.unwrap_err();
    assert!(matches!(err, ChronoError::Validation(_)));
    assert_eq!(store.backing().len(), 1);
}

// ── Initialization & backing errors ──────────────────────────────────────

#[tokio::test]
async fn writes_to_uninitialized_store_fail() {
    let store = FactStore::new(InMemoryBackingStore::uninitialized());
    assert!(matches!(
        store.put_fact(fact("a", "x", t0(), "v"), &none()).await,
        Err(ChronoError::NotInitialized)
    ));
    assert!(matches!(
        store.delete_fact("a", &none()).await,
        Err(ChronoError::NotInitialized)
    ));
    assert!(store.backing().is_empty());
}

#[tokio::test]
async fn backing_failures_are_wrapped_with_the_operation() {
    let store = setup();
    store.put_fact(fact("a", "x", t0(), "v"), &none()).await.unwrap();
    store.backing().set_fail_reads(true);

    let err = store.get_fact("a", &none()).await.unwrap_err();
    assert!(matches!(err, ChronoError::BackingStore { ref operation, .. } if operation == "get_fact"));
    assert_eq!(err.http_status(), 502);

    let err = store
        .query_by_field("ns", "x", &QueryOptions::new(), &none())
        .await
        .unwrap_err();
    assert!(matches!(err, ChronoError::BackingStore { ref operation, .. } if operation == "query_by_field"));
}

// ── Cancellation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_put_writes_nothing() {
    let store = setup();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = store
        .put_fact(fact("a", "x", t0(), "v"), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ChronoError::Canceled { ref operation } if operation == "put_fact"));
    assert_eq!(err.http_status(), 499);
    assert!(store.backing().is_empty());
}

#[tokio::test]
async fn expired_deadline_cancels_reads() {
    let store = setup();
    let cancel = CancellationToken::with_timeout(std::time::Duration::ZERO);
    assert!(matches!(
        store.get_snapshot_at_time("ns", t0(), &cancel).await,
        Err(ChronoError::Canceled { .. })
    ));
    assert!(matches!(
        store.query_by_time_range(&QueryOptions::new(), &cancel).await,
        Err(ChronoError::Canceled { .. })
    ));
}

// ── Concurrency ──────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_all_survive() {
    let store = Arc::new(setup());
    let mut handles = Vec::new();
    for w in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                // Every writer hits the same key and the same instant.
                let f = Fact::new(
                    format!("w{w}-{i}"),
                    "ns",
                    "hot",
                    "int",
                    serde_json::json!(w * 100 + i),
                    t0(),
                );
                store.put_fact(f, &CancellationToken::none()).await.unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let all = store
        .collect_all(
            QueryScope::Field(chronofact_core::FactKey::new("ns", "hot")),
            &QueryOptions::new().ascending().limit(16),
            &none(),
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 200);
    let mut ids: Vec<_> = all.iter().map(|f| f.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}

#[tokio::test]
async fn independent_stores_are_isolated() {
    let a = setup();
    let b = setup();
    a.put_fact(fact("row", "x", t0(), "v"), &none()).await.unwrap();
    assert!(b.get_fact("row", &none()).await.is_err());
}
