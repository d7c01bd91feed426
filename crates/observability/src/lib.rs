//! Tracing/logging setup shared by binaries and tests embedding the ledger.

/// Initialize process-wide logging, filtered by `RUST_LOG` (default `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide logging with an explicit filter directive, e.g.
/// the `log.filter` value of the ledger configuration.
pub fn init_with_filter(directive: &str) {
    tracing::init_with_filter(directive);
}

/// Subscriber construction (filters, formatting).
pub mod tracing;
