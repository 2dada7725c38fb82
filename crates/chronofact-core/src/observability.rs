//! Tracing subscriber setup for binaries and tests embedding the store.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Install a global `fmt` subscriber. `RUST_LOG` overrides `config.log_filter`.
///
/// Returns `false` if a global subscriber was already installed; calling
/// this more than once is harmless.
pub fn init_tracing(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logs {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
