//! Scenario tests for the request pipeline and session store.
//!
//! Each scenario runs against a `wiremock` server standing in for the
//! backend under `/api`.
//!
//! - `refresh.rs`      - single-flight refresh, queueing, stale credentials, retry cap
//! - `passthrough.rs`  - auth-domain passthrough, classification, notifications
//! - `teardown.rs`     - unrecoverable 401s and failed refreshes
//! - `session.rs`      - login, restore, identity, logout, account changes

mod refresh;
mod session;

use crate::{
    ApiClient, ClientOptions, Identity, RecordingNotifier, RecordingRedirect, SessionStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wallet_storage::{TokenPair, TokenVault};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A client wired to a mock backend with recording hooks.
pub(crate) struct Harness {
    pub server: MockServer,
    pub client: ApiClient,
    pub store: SessionStore,
    pub notifier: Arc<RecordingNotifier>,
    pub redirect: Arc<RecordingRedirect>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::with_vault(TokenVault::in_memory()).await
    }

    pub async fn with_vault(vault: TokenVault) -> Self {
        let server = MockServer::start().await;
        let client =
            ApiClient::new(ClientOptions::new(format!("{}/api", server.uri())), vault).unwrap();

        let notifier = Arc::new(RecordingNotifier::new());
        let redirect = Arc::new(RecordingRedirect::new());
        client.register_sink(notifier.clone());
        client.set_login_redirect(redirect.clone());

        Self {
            server,
            store: SessionStore::new(client.clone()),
            client,
            notifier,
            redirect,
        }
    }

    /// Install a token pair as if a login had happened.
    pub fn seed(&self, access_token: &str, refresh_token: &str) {
        self.client
            .session()
            .replace_tokens(&TokenPair::new(access_token, refresh_token))
            .unwrap();
    }

    pub fn seed_identity(&self, id: i64, email: &str) {
        self.client
            .session()
            .set_identity(Identity {
                id,
                email: email.to_string(),
            })
            .unwrap();
    }
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// 401 in the legacy shape, as sent for an expired access token.
pub(crate) fn expired() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" }))
}

pub(crate) fn structured(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "code": code, "message": message }))
}

pub(crate) fn tokens(access_token: &str, refresh_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "bearer",
    }))
}

/// Basic workflow: an authenticated request carries the bearer token and
/// passes a 2xx through unchanged.
#[tokio::test]
async fn basic_workflow() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");

    Mock::given(method("GET"))
        .and(path("/api/currencies/"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "code": "EUR" }])),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let currencies: Vec<Value> = h.client.get("currencies/").await.unwrap();

    assert_eq!(currencies.len(), 1);
    assert_eq!(currencies[0]["code"], "EUR");
    assert!(h.notifier.is_empty());
    assert!(!h.redirect.was_called());
}

#[tokio::test]
async fn unauthenticated_request_has_no_authorization_header() {
    let h = Harness::start().await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&h.server)
        .await;

    let _: Value = h.client.get("health").await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}
