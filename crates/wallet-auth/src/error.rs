//! Client error types.

use crate::classify::{classify, is_auth_domain_code, ErrorInfo};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A non-2xx response, classified.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    /// HTTP status code
    pub status: u16,
    /// Structured error code (`auth/...`, `resource/...`), absent for legacy payloads
    pub code: Option<String>,
    /// Presentable message
    pub message: String,
    /// Optional extra detail from the structured shape
    pub detail: Option<String>,
    /// Raw payload, `Null` when the body was not JSON
    pub body: Value,
}

impl ApiFailure {
    /// Classify a raw response body.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let ErrorInfo { code, message } = classify(&payload);
        let detail = code
            .as_ref()
            .and_then(|_| payload.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            status,
            code,
            message,
            detail,
            body: payload,
        }
    }

    /// Whether the code belongs to the auth domain.
    pub fn is_auth_domain(&self) -> bool {
        is_auth_domain_code(self.code.as_deref())
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({}, HTTP {})", self.message, code, self.status),
            None => write!(f, "{} (HTTP {})", self.message, self.status),
        }
    }
}

/// Why a token refresh did not produce a new token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    /// Status of the refresh response, absent when none was received
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl RefreshFailure {
    pub fn new(status: Option<u16>, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// The refreshing task went away before settling.
    pub fn abandoned() -> Self {
        Self::new(None, None, "Token refresh was abandoned")
    }

    /// The session ended while the refresh was in flight.
    pub fn session_ended() -> Self {
        Self::new(None, None, "Session ended before token refresh completed")
    }
}

impl From<&ApiFailure> for RefreshFailure {
    fn from(failure: &ApiFailure) -> Self {
        Self::new(Some(failure.status), failure.code.clone(), failure.message.clone())
    }
}

impl From<&reqwest::Error> for RefreshFailure {
    fn from(error: &reqwest::Error) -> Self {
        Self::new(error.status().map(|s| s.as_u16()), None, error.to_string())
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {})", self.message, status),
            None => f.write_str(&self.message),
        }
    }
}

/// Client error type.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was obtained (connect, timeout, body read)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 without an auth-domain code that could not be recovered
    #[error("Session expired: {0}")]
    AuthExpired(ApiFailure),

    /// 401 with an auth-domain code, returned untouched
    #[error("{0}")]
    AuthDomain(ApiFailure),

    /// The refresh endpoint rejected the refresh token
    #[error("Token refresh failed: {0}")]
    RefreshFailed(RefreshFailure),

    /// Any other non-2xx response
    #[error("{0}")]
    Api(ApiFailure),

    /// Token storage error
    #[error("Storage error: {0}")]
    Storage(#[from] wallet_storage::StorageError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid state transition in the session FSM
    #[error("Invalid auth state transition: {0}")]
    InvalidStateTransition(String),

    /// Operation needs a session and there is none
    #[error("Not logged in")]
    NotLoggedIn,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of the failure, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::AuthExpired(f) | ClientError::AuthDomain(f) | ClientError::Api(f) => {
                Some(f.status)
            }
            ClientError::RefreshFailed(f) => f.status,
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Structured error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::AuthExpired(f) | ClientError::AuthDomain(f) | ClientError::Api(f) => {
                f.code.as_deref()
            }
            ClientError::RefreshFailed(f) => f.code.as_deref(),
            _ => None,
        }
    }

    /// Whether this failure carries an auth-domain code.
    pub fn is_auth_domain(&self) -> bool {
        is_auth_domain_code(self.code())
    }

    /// Returns true if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(e) => e.is_connect() || e.is_timeout(),
            ClientError::Api(f) => f.status >= 500,
            _ => false,
        }
    }
}

impl From<wallet_core::CoreError> for ClientError {
    fn from(error: wallet_core::CoreError) -> Self {
        ClientError::Config(error.to_string())
    }
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;
