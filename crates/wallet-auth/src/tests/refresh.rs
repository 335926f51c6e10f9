//! Single-flight refresh and replay.

use super::{bearer, expired, tokens, Harness};
use crate::{AuthState, ClientError};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::task::JoinSet;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_expired_requests_share_one_refresh() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");

    Mock::given(method("GET"))
        .and(path("/api/transactions/"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(expired())
        .expect(5)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/transactions/"))
        .and(header("authorization", bearer("a-2").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
        .expect(5)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "r-1" })))
        .respond_with(tokens("a-2", "r-2").set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut tasks = JoinSet::new();
    for _ in 0..5 {
        let client = h.client.clone();
        tasks.spawn(async move { client.get::<Vec<Value>>("transactions/").await });
    }

    while let Some(joined) = tasks.join_next().await {
        let items = joined.unwrap().unwrap();
        assert_eq!(items.len(), 1);
    }

    let session = h.client.session();
    assert_eq!(session.access_token().as_deref(), Some("a-2"));
    assert_eq!(session.refresh_token().as_deref(), Some("r-2"));
    assert!(!h.client.refresh_coordinator().is_refreshing());
    assert_eq!(h.client.refresh_coordinator().queued(), 0);
    assert!(h.notifier.is_empty());
    assert!(!h.redirect.was_called());
}

#[tokio::test]
async fn replayed_request_is_not_retried_twice() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");

    Mock::given(method("GET"))
        .and(path("/api/analytics/summary"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(expired())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/summary"))
        .and(header("authorization", bearer("a-2").as_str()))
        .respond_with(expired())
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(tokens("a-2", "r-2"))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .client
        .get::<Value>("analytics/summary")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::AuthExpired(ref f) if f.message == "Not authenticated"));
    // The second failure is reported like any other, without a redirect
    assert_eq!(h.notifier.len(), 1);
    assert_eq!(h.notifier.notifications()[0].detail, "Not authenticated");
    assert!(!h.redirect.was_called());
    assert_eq!(h.client.session().access_token().as_deref(), Some("a-2"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stale_credential_replays_without_second_refresh() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");

    // The slow request's 401 lands after the fast one has already refreshed
    Mock::given(method("GET"))
        .and(path("/api/slow"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(expired().set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/fast"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(expired())
        .expect(1)
        .mount(&h.server)
        .await;
    for endpoint in ["/api/slow", "/api/fast"] {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("authorization", bearer("a-2").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&h.server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(tokens("a-2", "r-2"))
        .expect(1)
        .mount(&h.server)
        .await;

    let slow = {
        let client = h.client.clone();
        tokio::spawn(async move { client.get::<Value>("slow").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let fast: Value = h.client.get("fast").await.unwrap();
    let slow = slow.await.unwrap().unwrap();

    assert_eq!(fast["ok"], true);
    assert_eq!(slow["ok"], true);
    assert!(h.notifier.is_empty());
}

#[tokio::test]
async fn refresh_moves_session_through_refreshing() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");
    h.client
        .session()
        .transition(&crate::SessionMachineInput::LoginAttempt)
        .unwrap();
    h.client
        .session()
        .transition(&crate::SessionMachineInput::LoginSuccess)
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/storage-accounts/"))
        .and(header("authorization", bearer("a-1").as_str()))
        .respond_with(expired())
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/storage-accounts/"))
        .and(header("authorization", bearer("a-2").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(tokens("a-2", "r-2"))
        .expect(1)
        .mount(&h.server)
        .await;

    let states = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let seen = states.clone();
    h.client
        .session()
        .set_state_callback(Box::new(move |payload| seen.lock().push(payload.state)));

    let _: Vec<Value> = h.client.get("storage-accounts/").await.unwrap();

    assert_eq!(
        *states.lock(),
        vec![AuthState::Refreshing, AuthState::Authenticated]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn refresh_completes_after_leader_is_dropped() {
    let h = Harness::start().await;
    h.seed("a-1", "r-1");

    for endpoint in ["/api/income-sources/", "/api/currencies/"] {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("authorization", bearer("a-1").as_str()))
            .respond_with(expired())
            .mount(&h.server)
            .await;
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(header("authorization", bearer("a-2").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&h.server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "r-1" })))
        .respond_with(tokens("a-2", "r-2").set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&h.server)
        .await;

    let client = h.client.clone();
    let leader = tokio::spawn(async move { client.get::<Vec<Value>>("income-sources/").await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.client.refresh_coordinator().is_refreshing());

    let client = h.client.clone();
    let follower = tokio::spawn(async move { client.get::<Vec<Value>>("currencies/").await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.client.refresh_coordinator().queued(), 1);

    // The refresh request is already on the wire
    leader.abort();
    assert!(leader.await.unwrap_err().is_cancelled());

    let items = follower.await.unwrap().unwrap();
    assert!(items.is_empty());

    let session = h.client.session();
    assert_eq!(session.access_token().as_deref(), Some("a-2"));
    assert_eq!(session.refresh_token().as_deref(), Some("r-2"));
    assert!(!h.client.refresh_coordinator().is_refreshing());
    assert!(!h.redirect.was_called());
    assert!(h.notifier.is_empty());
}
