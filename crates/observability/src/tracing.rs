//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "BACKOFFICE_LOG_FORMAT";

/// Output format of the process-wide subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line; what log shippers expect.
    #[default]
    Json,
    /// Human-readable lines for interactive console use.
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    /// Unknown values fall back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" | "human" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Initialize tracing/logging for the process with the given format.
///
/// Filtering is configurable via `RUST_LOG` (default `info`).
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
}
