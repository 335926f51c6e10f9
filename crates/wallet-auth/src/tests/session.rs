//! Session store flows against the mock backend.

use super::{bearer, expired, structured, tokens, Harness};
use crate::{AuthState, ClientError, Identity};
use serde_json::{json, Value};
use tempfile::tempdir;
use wallet_storage::{open_vault, TokenPair, TokenVault};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn identity_response(id: i64, email: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "id": id, "email": email }))
}

#[tokio::test]
async fn login_then_silent_refresh() {
    let dir = tempdir().unwrap();
    let credentials = dir.path().join("credentials.json");
    let h = Harness::with_vault(open_vault(&credentials)).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "a@example.com", "password": "correct-horse" })))
        .respond_with(tokens("a-1", "r-1"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(identity_response(7, "a@example.com"))
        .expect(1)
        .mount(&h.server)
        .await;

    let identity = h.store.login("a@example.com", "correct-horse").await.unwrap();

    assert_eq!(
        identity,
        Identity {
            id: 7,
            email: "a@example.com".to_string()
        }
    );
    assert_eq!(h.store.state(), AuthState::Authenticated);
    assert_eq!(
        open_vault(&credentials).load_token_pair().unwrap(),
        Some(TokenPair::new("a-1", "r-1"))
    );

    // The server now considers a-1 expired
    Mock::given(method("GET"))
        .and(path("/api/transactions/"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Token expired" })),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "r-1" })))
        .respond_with(tokens("a-2", "r-2"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/transactions/"))
        .and(header("authorization", bearer("a-2").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .expect(1)
        .mount(&h.server)
        .await;

    let items: Vec<Value> = h.client.get("transactions/").await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(h.store.state(), AuthState::Authenticated);
    assert_eq!(h.store.identity().map(|i| i.id), Some(7));
    assert_eq!(
        open_vault(&credentials).load_token_pair().unwrap(),
        Some(TokenPair::new("a-2", "r-2"))
    );
    assert!(h.notifier.is_empty());
    assert!(!h.redirect.was_called());
}

#[tokio::test]
async fn register_stores_tokens_and_identity() {
    let h = Harness::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({
                "access_token": "a-1",
                "refresh_token": "r-1",
                "token_type": "bearer",
            })),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(identity_response(3, "new@example.com"))
        .mount(&h.server)
        .await;

    let identity = h.store.register("new@example.com", "long-enough").await.unwrap();

    assert_eq!(identity.id, 3);
    assert!(h.store.has_session());
    assert_eq!(h.store.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn logout_clears_locally_when_server_fails() {
    let dir = tempdir().unwrap();
    let credentials = dir.path().join("credentials.json");
    let h = Harness::with_vault(open_vault(&credentials)).await;
    h.seed("a-1", "r-1");
    h.seed_identity(7, "a@example.com");

    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(body_json(json!({ "refresh_token": "r-1" })))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&h.server)
        .await;

    h.store.logout().await;

    assert!(!h.store.has_session());
    assert_eq!(h.store.identity(), None);
    assert_eq!(h.store.state(), AuthState::SignedOut);
    assert!(!open_vault(&credentials).has_session().unwrap());
    assert!(h.notifier.is_empty());
    assert!(!h.redirect.was_called());

    // Logging out again is harmless and skips the server
    h.store.logout().await;
    assert!(!h.store.has_session());
}

#[tokio::test]
async fn restore_with_persisted_tokens() {
    let vault = TokenVault::in_memory();
    vault.set_token_pair(&TokenPair::new("a-1", "r-1")).unwrap();
    let h = Harness::with_vault(vault).await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(identity_response(7, "a@example.com"))
        .expect(1)
        .mount(&h.server)
        .await;

    let identity = h.store.restore().await.unwrap();

    assert_eq!(identity.map(|i| i.email), Some("a@example.com".to_string()));
    assert_eq!(h.store.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn restore_refreshes_expired_access_token() {
    let vault = TokenVault::in_memory();
    vault.set_token_pair(&TokenPair::new("a-1", "r-1")).unwrap();
    let h = Harness::with_vault(vault).await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(expired())
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(tokens("a-2", "r-2"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", bearer("a-2").as_str()))
        .respond_with(identity_response(7, "a@example.com"))
        .mount(&h.server)
        .await;

    let identity = h.store.restore().await.unwrap();

    assert_eq!(identity.map(|i| i.id), Some(7));
    assert_eq!(h.store.state(), AuthState::Authenticated);
}

#[tokio::test]
async fn restore_without_tokens() {
    let h = Harness::start().await;

    assert_eq!(h.store.restore().await.unwrap(), None);
    assert_eq!(h.store.state(), AuthState::SignedOut);
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unfetchable_identity_logs_out() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "Database unavailable" })),
        )
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h.store.fetch_identity().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!h.store.has_session());
    assert_eq!(h.store.state(), AuthState::SignedOut);
    assert_eq!(h.notifier.len(), 1);
}

#[tokio::test]
async fn change_email_replaces_identity() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");
    h.seed_identity(7, "old@example.com");

    Mock::given(method("PATCH"))
        .and(path("/api/auth/me/email"))
        .and(body_json(json!({ "current_password": "pw", "new_email": "new@example.com" })))
        .respond_with(identity_response(7, "new@example.com"))
        .expect(1)
        .mount(&h.server)
        .await;

    let identity = h.store.change_email("pw", "new@example.com").await.unwrap();

    assert_eq!(identity.email, "new@example.com");
    assert_eq!(h.store.identity(), Some(identity));
}

#[tokio::test]
async fn change_password_with_wrong_current_password() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");

    Mock::given(method("PATCH"))
        .and(path("/api/auth/me/password"))
        .respond_with(structured(401, "auth/invalid_credentials", "Current password is incorrect"))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/auth/me/password"))
        .and(body_json(json!({ "current_password": "right", "new_password": "new-password" })))
        .respond_with(ResponseTemplate::new(204))
        .with_priority(1)
        .mount(&h.server)
        .await;

    let err = h
        .store
        .change_password("wrong", "new-password")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthDomain(_)));
    assert!(!h.redirect.was_called());
    assert!(h.store.has_session());

    h.store.change_password("right", "new-password").await.unwrap();
}
