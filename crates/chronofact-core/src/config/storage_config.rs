//! Backing store configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the SQLite backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Number of read-only connections in the read pool.
    pub read_pool_size: usize,
    /// SQLite busy timeout applied to every connection.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            read_pool_size: 4,
            busy_timeout_ms: 5000,
        }
    }
}
