//! Key-level difference between two snapshots.

use chronofact_core::{FactChange, Snapshot, SnapshotDiff};

/// Compare `before` with `after`. Keys are classified as created, deleted
/// or modified (present in both with a different winning version).
/// Output vectors follow `FactKey` order.
pub fn diff(before: &Snapshot, after: &Snapshot) -> SnapshotDiff {
    let mut created = Vec::new();
    let mut deleted = Vec::new();
    let mut modified = Vec::new();

    for (key, old) in before.iter() {
        match after.get(key) {
            None => deleted.push(old.clone()),
            Some(new) if new != old => modified.push(FactChange {
                key: key.clone(),
                before: old.clone(),
                after: new.clone(),
            }),
            Some(_) => {}
        }
    }
    for (key, new) in after.iter() {
        if !before.contains(key) {
            created.push(new.clone());
        }
    }

    SnapshotDiff {
        namespace: after.namespace.clone(),
        from: before.as_of,
        to: after.as_of,
        created,
        deleted,
        modified,
    }
}
