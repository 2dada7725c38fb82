//! Turns caller `QueryOptions` into a validated, canonical scan plan.

use chronofact_core::config::QueryConfig;
use chronofact_core::{ChronoError, ChronoResult, QueryOptions, QueryScope, TimeWindow, VersionCursor};
use tracing::warn;

use super::token;

/// A validated query: scope, canonical window, direction, effective page
/// size and the resume point decoded from the caller's token.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub scope: QueryScope,
    pub window: TimeWindow,
    pub ascending: bool,
    pub limit: Option<usize>,
    pub after: Option<VersionCursor>,
    pub fingerprint: String,
}

impl QueryPlan {
    pub fn build(
        scope: QueryScope,
        options: &QueryOptions,
        config: &QueryConfig,
    ) -> ChronoResult<Self> {
        validate_scope(&scope)?;
        let window = options.window().canonicalized()?;
        let ascending = options.sort_ascending;
        let limit = resolve_limit(options.limit, config)?;
        let fingerprint = token::fingerprint(&scope, &window, ascending);

        let after = match options.continuation_token.as_deref() {
            Some(raw) => Some(token::decode(raw, &fingerprint, ascending).map_err(|e| {
                warn!("rejected continuation token for {}: {e}", scope.label());
                ChronoError::from(e)
            })?),
            None => None,
        };

        Ok(Self {
            scope,
            window,
            ascending,
            limit,
            after,
            fingerprint,
        })
    }
}

fn validate_scope(scope: &QueryScope) -> ChronoResult<()> {
    match scope {
        QueryScope::Field(key) => {
            if key.namespace.is_empty() {
                return Err(ChronoError::Validation("namespace must not be empty".to_string()));
            }
            if key.field_name.is_empty() {
                return Err(ChronoError::Validation("field name must not be empty".to_string()));
            }
        }
        QueryScope::Namespace(ns) if ns.is_empty() => {
            return Err(ChronoError::Validation("namespace must not be empty".to_string()));
        }
        QueryScope::Namespace(_) | QueryScope::All => {}
    }
    Ok(())
}

/// Effective page size: zero is rejected, oversize limits are clamped, and
/// the configured default applies when the caller gives none.
pub fn resolve_limit(requested: Option<usize>, config: &QueryConfig) -> ChronoResult<Option<usize>> {
    match requested {
        Some(0) => Err(ChronoError::Validation("limit must be at least 1".to_string())),
        Some(n) => Ok(Some(n.min(config.max_page_size))),
        None => Ok(config.default_page_size.map(|d| d.min(config.max_page_size))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chronofact_core::FactKey;

    #[test]
    fn limit_resolution() {
        let config = QueryConfig::default();
        assert!(matches!(resolve_limit(Some(0), &config), Err(ChronoError::Validation(_))));
        assert_eq!(resolve_limit(Some(10), &config).unwrap(), Some(10));
        assert_eq!(resolve_limit(Some(1_000_000), &config).unwrap(), Some(config.max_page_size));
        assert_eq!(resolve_limit(None, &config).unwrap(), None);

        let paged = QueryConfig {
            default_page_size: Some(25),
            ..QueryConfig::default()
        };
        assert_eq!(resolve_limit(None, &paged).unwrap(), Some(25));
    }

    #[test]
    fn empty_names_are_rejected() {
        let config = QueryConfig::default();
        let opts = QueryOptions::new();
        assert!(QueryPlan::build(QueryScope::Namespace(String::new()), &opts, &config).is_err());
        assert!(QueryPlan::build(QueryScope::Field(FactKey::new("ns", "")), &opts, &config).is_err());
        assert!(QueryPlan::build(QueryScope::All, &opts, &config).is_ok());
    }

    #[test]
    fn window_is_canonicalised_before_fingerprinting() {
        let config = QueryConfig::default();
        let t = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let a = QueryPlan::build(QueryScope::All, &QueryOptions::new().start(t), &config).unwrap();
        let b = QueryPlan::build(
            QueryScope::All,
            &QueryOptions::new().start(t - Duration::nanoseconds(789)),
            &config,
        )
        .unwrap();
        assert_eq!(a.window, b.window);
        assert_eq!(a.fingerprint, b.fingerprint);
    }
}
