//! Core error types.

use thiserror::Error;

/// Errors raised while locating, reading or validating client configuration.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The configuration parsed but is unusable, e.g. a non-base API URL.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// `config.json` is not valid JSON for [`crate::Config`].
    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory to put `~/.wallet` under.
    #[error("Path error: {0}")]
    Path(String),
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
