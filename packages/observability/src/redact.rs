//! Redaction of credential-bearing log fields.

use serde_json::Value;
use std::collections::HashMap;

/// Replacement written in place of a sensitive value.
pub const REDACTED: &str = "[redacted]";

const DENYLIST_KEYS: [&str; 8] = [
    "token",
    "access_token",
    "refresh_token",
    "authorization",
    "cookie",
    "password",
    "secret",
    "credentials",
];

/// Returns true if a field name looks like it carries a credential.
///
/// Matching is case-insensitive and substring-based, so `new_password`
/// and `Authorization` are both caught.
pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    DENYLIST_KEYS.iter().any(|entry| lower.contains(entry))
}

/// Redact sensitive fields in place.
pub(crate) fn redact_fields(fields: &mut HashMap<String, Value>) {
    for (key, value) in fields.iter_mut() {
        if is_sensitive_key(key) {
            *value = Value::String(REDACTED.to_string());
        }
    }
}

/// Masks bearer credentials embedded in free-form text.
pub(crate) fn redact_message(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(idx) = rest.find("Bearer ") {
        let (head, tail) = rest.split_at(idx + "Bearer ".len());
        out.push_str(head);
        out.push_str(REDACTED);
        let end = tail
            .find(|c: char| c.is_whitespace() || c == '"' || c == ',')
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}
