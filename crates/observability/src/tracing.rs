//! Tracing/logging initialization.
//!
//! One JSON line per event, filterable via `RUST_LOG`. The reconciliation
//! and dispatch paths emit structured fields (aggregate ids, period bounds,
//! degraded-record warnings) that stay machine-readable in this format.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
