//! Query option and result shapes shared by every list-style operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fact::{canonical_timestamp, Fact};
use super::key::{FactKey, Partition};
use crate::errors::{ChronoError, ChronoResult};

/// Inclusive time window. An absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Everything recorded at or before `at`.
    pub fn until(at: DateTime<Utc>) -> Self {
        Self {
            start: None,
            end: Some(at),
        }
    }

    /// Both bounds canonicalised; fails if start is after end.
    pub fn canonicalized(self) -> ChronoResult<Self> {
        let window = Self {
            start: self.start.map(canonical_timestamp),
            end: self.end.map(canonical_timestamp),
        };
        if let (Some(start), Some(end)) = (window.start, window.end) {
            if start > end {
                return Err(ChronoError::Validation(format!(
                    "start_time {} is after end_time {}",
                    start.to_rfc3339(),
                    end.to_rfc3339()
                )));
            }
        }
        Ok(window)
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        if matches!(self.start, Some(s) if *ts < s) {
            return false;
        }
        if matches!(self.end, Some(e) if *ts > e) {
            return false;
        }
        true
    }
}

/// Candidate set a query selects from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryScope {
    Field(FactKey),
    Namespace(String),
    /// Every namespace; bounded only by the time window.
    All,
}

impl QueryScope {
    /// Adapter partition for this scope; `None` means a global time scan.
    pub fn partition(&self) -> Option<Partition> {
        match self {
            Self::Field(key) => Some(Partition::Field(key.clone())),
            Self::Namespace(ns) => Some(Partition::Namespace(ns.clone())),
            Self::All => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Field(key) => format!("field:{key}"),
            Self::Namespace(ns) => format!("namespace:{ns:?}"),
            Self::All => "all".to_string(),
        }
    }
}

/// Options accepted by every query operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Inclusive lower bound.
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub end_time: Option<DateTime<Utc>>,
    /// Oldest first when true; newest first by default.
    pub sort_ascending: bool,
    pub limit: Option<usize>,
    /// Opaque token from a previous page.
    pub continuation_token: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
            ..Self::default()
        }
    }

    pub fn ascending(mut self) -> Self {
        self.sort_ascending = true;
        self
    }

    pub fn descending(mut self) -> Self {
        self.sort_ascending = false;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Same query, resumed from `token`.
    pub fn continue_from(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub facts: Vec<Fact>,
    /// Present iff more pages exist.
    pub continuation_token: Option<String>,
}

impl QueryResult {
    pub fn has_more(&self) -> bool {
        self.continuation_token.is_some()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
