//! Error payload classification.
//!
//! The backend answers failures with either the structured shape
//! `{ "code": "...", "message": "...", "detail"?: "..." }` or the legacy
//! `{ "detail": "..." }`. Anything else degrades to a generic message.

use serde_json::Value;

/// Message used when a payload carries nothing presentable.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Codes under this prefix belong to the auth domain and are handled by
/// the caller, never by the pipeline.
pub const AUTH_CODE_PREFIX: &str = "auth/";

/// Stable code and human-readable message extracted from a failure payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub code: Option<String>,
    pub message: String,
}

/// Classify an error payload.
pub fn classify(payload: &Value) -> ErrorInfo {
    if let Some((code, message)) = structured(payload) {
        return ErrorInfo {
            code: Some(code.to_string()),
            message: message.to_string(),
        };
    }

    if let Some(detail) = payload.get("detail").and_then(Value::as_str) {
        return ErrorInfo {
            code: None,
            message: detail.to_string(),
        };
    }

    ErrorInfo {
        code: None,
        message: GENERIC_ERROR_MESSAGE.to_string(),
    }
}

/// Structured error code, if the payload has one. Legacy payloads have none.
pub fn error_code(payload: &Value) -> Option<String> {
    structured(payload).map(|(code, _)| code.to_string())
}

/// Whether `code` names an auth-domain failure.
pub fn is_auth_domain_code(code: Option<&str>) -> bool {
    code.is_some_and(|code| code.starts_with(AUTH_CODE_PREFIX))
}

fn structured(payload: &Value) -> Option<(&str, &str)> {
    let object = payload.as_object()?;
    let code = object.get("code")?.as_str()?;
    let message = object.get("message")?.as_str()?;
    Some((code, message))
}
