pub mod observability_config;
pub mod query_config;
pub mod storage_config;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use observability_config::ObservabilityConfig;
pub use query_config::QueryConfig;
pub use storage_config::StorageConfig;

use crate::errors::{ChronoError, ChronoResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChronoConfig {
    pub storage: StorageConfig,
    pub query: QueryConfig,
    pub observability: ObservabilityConfig,
}

impl ChronoConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load and validate in one step, mapping parse failures to `ChronoError::Config`.
    pub fn load(toml_str: &str) -> ChronoResult<Self> {
        let config = Self::from_toml(toml_str).map_err(|e| {
            warn!("config parse failed: {e}");
            ChronoError::Config(e.to_string())
        })?;
        if let Err(e) = config.validate() {
            warn!("config rejected: {e}");
            return Err(e);
        }
        debug!(
            "config loaded (read pool {}, max page {})",
            config.storage.read_pool_size, config.query.max_page_size
        );
        Ok(config)
    }

    /// Reject settings the store cannot run with.
    pub fn validate(&self) -> ChronoResult<()> {
        if self.storage.read_pool_size == 0 {
            return Err(ChronoError::Config(
                "storage.read_pool_size must be at least 1".to_string(),
            ));
        }
        if self.query.max_page_size == 0 {
            return Err(ChronoError::Config(
                "query.max_page_size must be at least 1".to_string(),
            ));
        }
        if self.query.snapshot_scan_page_size == 0 {
            return Err(ChronoError::Config(
                "query.snapshot_scan_page_size must be at least 1".to_string(),
            ));
        }
        if let Some(default) = self.query.default_page_size {
            if default == 0 || default > self.query.max_page_size {
                return Err(ChronoError::Config(format!(
                    "query.default_page_size must be in 1..={}, got {default}",
                    self.query.max_page_size
                )));
            }
        }
        Ok(())
    }
}
