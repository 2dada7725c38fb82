//! As-of snapshots and the diff between two of them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fact::Fact;
use super::key::FactKey;

/// Reconstructed state of a namespace (or all namespaces) at `as_of`.
///
/// Holds the winning, non-tombstone version of every key. Serialised as a
/// list of facts; keys are rebuilt from each fact on the way back in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// `None` when the snapshot spans every namespace.
    pub namespace: Option<String>,
    pub as_of: DateTime<Utc>,
    #[serde(with = "entries_as_facts")]
    pub entries: BTreeMap<FactKey, Fact>,
}

impl Snapshot {
    pub fn new(namespace: Option<String>, as_of: DateTime<Utc>) -> Self {
        Self {
            namespace,
            as_of,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &FactKey) -> Option<&Fact> {
        self.entries.get(key)
    }

    /// Lookup by field name alone. Only meaningful for a namespace-scoped
    /// snapshot; returns `None` for one spanning all namespaces.
    pub fn field(&self, field_name: &str) -> Option<&Fact> {
        let ns = self.namespace.as_ref()?;
        self.entries.get(&FactKey::new(ns.as_str(), field_name))
    }

    /// `field_name -> fact` view of a namespace-scoped snapshot.
    pub fn fields(&self) -> BTreeMap<&str, &Fact> {
        self.entries
            .iter()
            .map(|(k, v)| (k.field_name.as_str(), v))
            .collect()
    }

    pub fn contains(&self, key: &FactKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FactKey, &Fact)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Fact> {
        self.entries.values()
    }
}

/// A key whose winning version changed between two instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactChange {
    pub key: FactKey,
    pub before: Fact,
    pub after: Fact,
}

/// Difference between the snapshots at `from` and `to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub namespace: Option<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Present at `to`, absent at `from`.
    pub created: Vec<Fact>,
    /// Present at `from`, absent at `to`. Holds the version visible at `from`.
    pub deleted: Vec<Fact>,
    pub modified: Vec<FactChange>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.created.len() + self.deleted.len() + self.modified.len()
    }
}

mod entries_as_facts {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Fact, FactKey};

    pub fn serialize<S: Serializer>(
        entries: &BTreeMap<FactKey, Fact>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let facts: Vec<&Fact> = entries.values().collect();
        facts.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<FactKey, Fact>, D::Error> {
        let facts = Vec::<Fact>::deserialize(deserializer)?;
        Ok(facts.into_iter().map(|f| (f.key(), f)).collect())
    }
}
