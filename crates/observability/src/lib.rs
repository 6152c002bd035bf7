//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

pub use tracing::LogFormat;

/// Tracing configuration (filters, layers).
pub mod tracing;
