//! Fact: the immutable, timestamped version of a field's value.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::key::{FactKey, VersionPosition};
use crate::errors::{ChronoError, ChronoResult};

/// Truncate an instant to the store's single resolution (microseconds, UTC).
///
/// Every timestamp is passed through this before it is written, compared,
/// or encoded into a cursor.
pub fn canonical_timestamp(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Column descriptor carried by facts that define a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: String,
}

/// One versioned observation of a field. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Logical entity across versions; shared by many stored items.
    pub id: String,
    /// Writer-assigned instant (UTC).
    pub timestamp: DateTime<Utc>,
    pub namespace: String,
    pub field_name: String,
    /// Opaque to the store.
    pub data_type: String,
    /// `None` together with `is_deleted` marks a tombstone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub is_deleted: bool,
    /// Only set when the fact describes a table schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnDef>>,
}

impl Fact {
    /// A live fact stamped with `timestamp`.
    pub fn new(
        id: impl Into<String>,
        namespace: impl Into<String>,
        field_name: impl Into<String>,
        data_type: impl Into<String>,
        value: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp,
            namespace: namespace.into(),
            field_name: field_name.into(),
            data_type: data_type.into(),
            value: Some(value),
            is_deleted: false,
            columns: None,
        }
    }

    /// Same as [`Fact::new`] with a random v4 id.
    pub fn with_generated_id(
        namespace: impl Into<String>,
        field_name: impl Into<String>,
        data_type: impl Into<String>,
        value: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            namespace,
            field_name,
            data_type,
            value,
            timestamp,
        )
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDef>) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Tombstone superseding `self` at `timestamp`.
    pub fn tombstone_at(&self, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: self.id.clone(),
            timestamp,
            namespace: self.namespace.clone(),
            field_name: self.field_name.clone(),
            data_type: self.data_type.clone(),
            value: None,
            is_deleted: true,
            columns: None,
        }
    }

    pub fn key(&self) -> FactKey {
        FactKey::new(self.namespace.as_str(), self.field_name.as_str())
    }

    pub fn is_tombstone(&self) -> bool {
        self.is_deleted
    }

    /// Copy of this fact with its timestamp canonicalised.
    pub fn canonicalized(mut self) -> Self {
        self.timestamp = canonical_timestamp(self.timestamp);
        self
    }

    /// Structural checks performed before any write.
    pub fn validate(&self) -> ChronoResult<()> {
        if self.id.trim().is_empty() {
            return Err(ChronoError::Validation("fact id must not be empty".to_string()));
        }
        if self.namespace.is_empty() {
            return Err(ChronoError::Validation(format!(
                "fact '{}' is missing a namespace",
                self.id
            )));
        }
        if self.field_name.is_empty() {
            return Err(ChronoError::Validation(format!(
                "fact '{}' is missing a field name",
                self.id
            )));
        }
        if self.is_deleted && self.value.is_some() {
            return Err(ChronoError::Validation(format!(
                "tombstone for '{}' must not carry a value",
                self.id
            )));
        }
        Ok(())
    }
}

/// A fact as held by a backing store: the fact plus the insertion
/// sequence the store assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFact {
    pub sequence: u64,
    pub fact: Fact,
}

impl StoredFact {
    pub fn new(sequence: u64, fact: Fact) -> Self {
        Self { sequence, fact }
    }

    pub fn position(&self) -> VersionPosition {
        VersionPosition::new(self.fact.timestamp, self.sequence)
    }

    pub fn into_fact(self) -> Fact {
        self.fact
    }
}
