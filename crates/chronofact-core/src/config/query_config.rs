//! Query and snapshot engine configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size applied when a query carries no limit. `None` = unbounded.
    pub default_page_size: Option<usize>,
    /// Larger caller limits are clamped to this.
    pub max_page_size: usize,
    /// Page size used by the snapshot engine when scanning the adapter.
    pub snapshot_scan_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: None,
            max_page_size: 1000,
            snapshot_scan_page_size: 500,
        }
    }
}
