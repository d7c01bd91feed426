//! Tracing/logging initialization.
//!
//! JSON lines with timestamps; the filter comes from `RUST_LOG` or from the
//! caller's configuration.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Initialize tracing/logging for the process from `RUST_LOG`.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter);
}

/// Initialize tracing/logging with `directive`. An unparsable directive falls
/// back to the default filter and is reported once the subscriber is up.
pub fn init_with_filter(directive: &str) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => install(filter),
        Err(err) => {
            install(EnvFilter::new(DEFAULT_FILTER));
            ::tracing::warn!(directive, error = %err, "invalid log filter, using default");
        }
    }
}

fn install(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
