//! Logging initialization.
//!
//! Thin wrapper over the observability crate so every binary in the
//! workspace logs the same way: JSONL to `log_path` (the CLI uses
//! `~/.wallet/logs/wallet.jsonl`), filtered by `RUST_LOG` or the configured
//! level.

use std::path::PathBuf;

/// Initialize the logging system.
///
/// * `service_name` - Included in every log line
/// * `level` - Default log level (trace, debug, info, warn, error)
/// * `log_path` - JSONL destination; `None` uses the observability default
/// * `also_stderr` - Mirror events to stderr
pub fn init_logging(service_name: &str, level: &str, log_path: Option<PathBuf>, also_stderr: bool) {
    observability::init_with_config(observability::LogConfig {
        service_name: service_name.into(),
        default_level: level.into(),
        log_path,
        also_stderr,
    });
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
