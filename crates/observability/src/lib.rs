//! Tracing/logging setup shared by the console and the client crates.

/// Initialize process-wide observability (tracing/logging).
///
/// The output format comes from `BACKOFFICE_LOG_FORMAT` (`json` by default).
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use self::tracing::LogFormat;
