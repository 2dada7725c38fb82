//! Runs a `QueryPlan` against the backing store.

use tracing::debug;

use chronofact_core::{
    CancellationToken, ChronoError, ChronoResult, IBackingStore, QueryResult, StoredFact,
};

use super::plan::QueryPlan;
use super::token;

/// One page of results. Asks the adapter for one item more than the page
/// size so the presence of a next page is known without a second call.
pub fn execute<B: IBackingStore + ?Sized>(
    store: &B,
    plan: &QueryPlan,
    operation: &str,
    cancel: &CancellationToken,
) -> ChronoResult<QueryResult> {
    cancel.check(operation)?;

    let fetch = plan.limit.map(|l| l.saturating_add(1));
    let mut items = match plan.scope.partition() {
        Some(partition) => store.query_range(
            &partition,
            &plan.window,
            plan.after.as_ref(),
            plan.ascending,
            fetch,
        ),
        None => store.list_all(&plan.window, plan.after.as_ref(), plan.ascending, fetch),
    }
    .map_err(|e| ChronoError::backing(operation, e))?;

    let mut continuation_token = None;
    if let Some(limit) = plan.limit {
        if items.len() > limit {
            items.truncate(limit);
            if let Some(last) = items.last() {
                continuation_token =
                    Some(token::encode(&last.position(), plan.ascending, &plan.fingerprint)?);
            }
        }
    }

    debug!(
        "{operation}: {} -> {} facts (more: {})",
        plan.scope.label(),
        items.len(),
        continuation_token.is_some()
    );

    Ok(QueryResult {
        facts: items.into_iter().map(StoredFact::into_fact).collect(),
        continuation_token,
    })
}
