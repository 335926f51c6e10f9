//! Request and response values passed through the pipeline.

use crate::ClientResult;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A request relative to the API base URL.
///
/// Requests are plain values so the pipeline can replay them after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path under the base URL, e.g. `transactions/` or `auth/me`
    pub path: String,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON body.
    pub fn with_body<B: Serialize + ?Sized>(self, body: &B) -> ClientResult<Self> {
        Ok(self.json(serde_json::to_value(body)?))
    }

    /// Append the fields of `query` as query parameters. `None` fields are skipped.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> ClientResult<Self> {
        self.query.extend(query_pairs(query)?);
        Ok(self)
    }
}

/// Flatten a serializable struct into query parameters.
pub fn query_pairs<Q: Serialize + ?Sized>(query: &Q) -> ClientResult<Vec<(String, String)>> {
    let Value::Object(fields) = serde_json::to_value(query)? else {
        return Ok(Vec::new());
    };

    Ok(fields
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, value))
        })
        .collect())
}

/// A received response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
