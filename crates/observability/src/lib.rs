//! Tracing and logging setup shared by the service binaries.

/// Initialize process-wide tracing/logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(logging::LogFormat::from_env());
}

/// Tracing subscriber installation (filters, formatters).
pub mod tracing;

/// Log output format selection.
pub mod logging;
