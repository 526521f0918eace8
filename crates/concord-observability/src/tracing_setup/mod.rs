//! Tracing setup: structured JSON logging and event helpers.

pub mod events;

use tracing_subscriber::EnvFilter;

use concord_core::config::defaults::DEFAULT_LOG_LEVEL;
use concord_core::config::ObservabilityConfig;

/// Initialize the tracing subscriber with structured JSON output.
///
/// Respects the `CONCORD_LOG` environment variable for filtering.
/// Defaults to `info` level if not set.
pub fn init_tracing() {
    install(DEFAULT_LOG_LEVEL);
}

/// Same as [`init_tracing`], falling back to the configured level when
/// `CONCORD_LOG` is unset.
pub fn init_tracing_from_config(config: &ObservabilityConfig) {
    install(&config.log_level);
}

fn install(fallback: &str) {
    let filter =
        EnvFilter::try_from_env("CONCORD_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));

    // A host application may already own the global subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .try_init();
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .try_init();
}
