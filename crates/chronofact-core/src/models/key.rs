//! Composite keys and version ordering.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fact::Fact;

/// `(namespace, field_name)`: the slot a version chain belongs to.
///
/// Ordered lexicographically by namespace, then field name. The two parts
/// are kept separate, so names containing any delimiter never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactKey {
    pub namespace: String,
    pub field_name: String,
}

impl FactKey {
    pub fn new(namespace: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.namespace, self.field_name)
    }
}

/// Sort position of a stored version: timestamp, then insertion sequence.
///
/// Field order matters: the derived `Ord` compares `timestamp` first and
/// falls back to `sequence` for equal timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionPosition {
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
}

impl VersionPosition {
    pub fn new(timestamp: DateTime<Utc>, sequence: u64) -> Self {
        Self {
            timestamp,
            sequence,
        }
    }
}

/// Resume point for keyset pagination: the last position already returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCursor(pub VersionPosition);

impl VersionCursor {
    /// Whether `position` lies strictly beyond the cursor in scan direction.
    pub fn admits(&self, position: &VersionPosition, ascending: bool) -> bool {
        if ascending {
            *position > self.0
        } else {
            *position < self.0
        }
    }
}

/// Partition an adapter range query is bounded by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Partition {
    /// Every field within one namespace.
    Namespace(String),
    /// One field's version chain.
    Field(FactKey),
}

impl Partition {
    pub fn matches(&self, fact: &Fact) -> bool {
        match self {
            Self::Namespace(ns) => fact.namespace == *ns,
            Self::Field(key) => fact.namespace == key.namespace && fact.field_name == key.field_name,
        }
    }
}
