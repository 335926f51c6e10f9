//! Authentication-aware request pipeline.
//!
//! Every managed request goes through the same steps:
//!
//! 1. The current access token is attached as a bearer token.
//! 2. A 2xx response is returned unchanged.
//! 3. A 401 whose code is outside the `auth/` domain starts (or joins) a
//!    single-flight refresh, and the request is replayed once with the new
//!    token. Without a refresh token, or when the refresh fails, the session
//!    is torn down and the login redirect fires.
//! 4. Everything else is classified, reported to the notification sink
//!    unless it belongs to the auth domain, and returned.

use crate::auth_fsm::SessionMachineInput;
use crate::navigation::{LoginRedirect, NoopRedirect};
use crate::notify::{Notification, NotificationSink, NotificationSlot, DEFAULT_NOTIFICATION_TTL};
use crate::refresh::{RefreshCoordinator, RefreshGuard, RefreshTicket};
use crate::session::SessionState;
use crate::wire::TokenResponse;
use crate::{
    ApiFailure, ApiRequest, ApiResponse, ClientError, ClientResult, RefreshFailure,
    GENERIC_ERROR_MESSAGE,
};
use parking_lot::RwLock;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;
use wallet_core::Config;
use wallet_storage::{TokenPair, TokenVault};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Construction parameters for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Transport timeout per request
    pub timeout: Duration,
    /// Display lifetime of error notifications
    pub notification_ttl: Duration,
}

impl ClientOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }

    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            base_url: config.api_url()?.to_string(),
            timeout: config.request_timeout(),
            notification_ttl: config.notification_ttl(),
        })
    }
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    session: SessionState,
    refresh: RefreshCoordinator,
    notifications: NotificationSlot,
    redirect: RwLock<Arc<dyn LoginRedirect>>,
    notification_ttl: Duration,
}

/// HTTP client for the wallet API. Cheap to clone; clones share the
/// session, the refresh coordinator and the registered hooks.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Create a client whose session is loaded from `vault`.
    pub fn new(options: ClientOptions, vault: TokenVault) -> ClientResult<Self> {
        let base = Url::parse(&options.base_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "API URL cannot be used as a base: {}",
                options.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: options.base_url.trim_end_matches('/').to_string(),
                session: SessionState::new(vault),
                refresh: RefreshCoordinator::new(),
                notifications: NotificationSlot::new(),
                redirect: RwLock::new(Arc::new(NoopRedirect)),
                notification_ttl: options.notification_ttl,
            }),
        })
    }

    pub fn from_config(config: &Config, vault: TokenVault) -> ClientResult<Self> {
        Self::new(ClientOptions::from_config(config)?, vault)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.inner.refresh
    }

    /// Register the notification sink, replacing any previous one.
    pub fn register_sink(&self, sink: Arc<dyn NotificationSink>) {
        self.inner.notifications.register(sink);
    }

    pub fn clear_sink(&self) {
        self.inner.notifications.clear();
    }

    /// Replace the hook invoked when the user must sign in again.
    pub fn set_login_redirect(&self, redirect: Arc<dyn LoginRedirect>) {
        *self.inner.redirect.write() = redirect;
    }

    /// Absolute URL for a path under the base URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    // ==========================================
    // Typed helpers
    // ==========================================

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: Vec<(String, String)>,
    ) -> ClientResult<ApiResponse> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        request.query = query;
        self.execute(request).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.execute(ApiRequest::get(path)).await?.json()
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(ApiRequest::get(path).with_query(query)?)
            .await?
            .json()
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::post(path).with_body(body)?)
            .await?
            .json()
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::put(path).with_body(body)?)
            .await?
            .json()
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::patch(path).with_body(body)?)
            .await?
            .json()
    }

    /// PATCH for endpoints that answer 204.
    pub async fn patch_no_content<B>(&self, path: &str, body: &B) -> ClientResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(ApiRequest::patch(path).with_body(body)?).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(ApiRequest::delete(path)).await?;
        Ok(())
    }

    // ==========================================
    // Pipeline
    // ==========================================

    /// Send `request` through the full pipeline.
    pub async fn execute(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let span = info_span!(
            "api_request",
            request_id = %Uuid::new_v4(),
            method = %request.method,
            path = %request.path,
        );
        self.execute_managed(request).instrument(span).await
    }

    /// Send with the current bearer token and return whatever came back.
    /// No refresh handling, no notifications.
    pub async fn execute_unmanaged(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let token = self.inner.session.access_token();
        Ok(self.send(&request, token.as_deref()).await?)
    }

    /// Reset the refresh queue and clear the session without redirecting.
    pub fn end_session(&self, input: &SessionMachineInput) {
        self.inner.refresh.reset();
        self.inner.session.end(input);
    }

    async fn execute_managed(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        let sent_with = self.inner.session.access_token();
        let response = match self.send(&request, sent_with.as_deref()).await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_failure(e)),
        };

        if response.is_success() {
            return Ok(response);
        }

        let failure = ApiFailure::from_body(response.status, &response.body);
        if failure.status != 401 || failure.is_auth_domain() {
            return Err(self.reject(failure));
        }

        debug!("Access token rejected");
        let Some(refresh_token) = self.inner.session.refresh_token() else {
            warn!("No refresh token held, ending session");
            self.inner.session.end(&SessionMachineInput::SessionRevoked);
            self.force_login_redirect();
            return Err(ClientError::AuthExpired(failure));
        };

        let token = match self.inner.refresh.begin() {
            RefreshTicket::Follower(pending) => {
                debug!(waiter = pending.id(), "Waiting for in-flight refresh");
                pending.wait().await.map_err(ClientError::RefreshFailed)?
            }
            RefreshTicket::Leader(guard) => match self.inner.session.access_token() {
                // Someone refreshed between our send and this response
                Some(current) if Some(&current) != sent_with.as_ref() => {
                    debug!("Access token changed since send, replaying with current token");
                    guard.resolve(&current);
                    current
                }
                _ => self.spawn_refresh(guard, refresh_token).await?,
            },
        };

        debug!("Replaying request");
        match self.send(&request, Some(&token)).await {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => Err(self.reject(ApiFailure::from_body(response.status, &response.body))),
            Err(e) => Err(self.transport_failure(e)),
        }
    }

    /// Run the refresh in its own task and wait for it like a follower would.
    ///
    /// The server rotates the refresh token on use, so once the call is sent
    /// it must settle (persist and release the queue) even if the request
    /// that started it is dropped.
    async fn spawn_refresh(&self, guard: RefreshGuard, refresh_token: String) -> ClientResult<String> {
        let client = self.clone();
        let task = tokio::spawn(
            async move { client.refresh_as_leader(guard, &refresh_token).await }
                .instrument(info_span!("token_refresh")),
        );

        match task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Refresh task did not complete");
                Err(ClientError::RefreshFailed(RefreshFailure::abandoned()))
            }
        }
    }

    async fn refresh_as_leader(&self, guard: RefreshGuard, refresh_token: &str) -> ClientResult<String> {
        let session = &self.inner.session;
        session.transition_quiet(&SessionMachineInput::TokenExpired);
        info!("Refreshing access token");

        let failure = match self.call_refresh(refresh_token).await {
            Ok(_) if !guard.is_current() => {
                debug!("Session ended during refresh, discarding new tokens");
                return Err(ClientError::RefreshFailed(RefreshFailure::session_ended()));
            }
            Ok(pair) => {
                if let Err(e) = session.replace_tokens(&pair) {
                    warn!(error = %e, "Failed to persist refreshed tokens");
                }
                let released = guard.resolve(&pair.access_token);
                session.transition_quiet(&SessionMachineInput::RefreshSuccess);
                info!(released = released.len(), "Access token refreshed");
                return Ok(pair.access_token);
            }
            Err(failure) => failure,
        };

        warn!(error = %failure, "Token refresh failed, ending session");
        session.end(&SessionMachineInput::RefreshFailed);
        let released = guard.reject(&failure);
        debug!(rejected = released.len(), "Rejected queued requests");
        self.force_login_redirect();
        Err(ClientError::RefreshFailed(failure))
    }

    async fn call_refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshFailure> {
        let request = ApiRequest::post("auth/refresh").json(json!({ "refresh_token": refresh_token }));
        let response = self
            .send(&request, None)
            .await
            .map_err(|e| RefreshFailure::from(&e))?;

        if !response.is_success() {
            let failure = ApiFailure::from_body(response.status, &response.body);
            return Err(RefreshFailure::from(&failure));
        }

        response
            .json::<TokenResponse>()
            .map(TokenResponse::into_pair)
            .map_err(|e| {
                RefreshFailure::new(
                    Some(response.status),
                    None,
                    format!("Malformed refresh response: {}", e),
                )
            })
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<ApiResponse, reqwest::Error> {
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), self.url_for(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        debug!(status, authenticated = token.is_some(), "Response received");

        Ok(ApiResponse { status, body })
    }

    /// Classify a final failure, notify unless it is auth-domain, and map
    /// it to the error variant.
    fn reject(&self, failure: ApiFailure) -> ClientError {
        if failure.is_auth_domain() {
            debug!(status = failure.status, code = ?failure.code, "Auth-domain failure passed through");
        } else {
            warn!(status = failure.status, code = ?failure.code, message = %failure.message, "Request failed");
            self.notify(&failure.message);
        }

        match failure.status {
            401 if failure.is_auth_domain() => ClientError::AuthDomain(failure),
            401 => ClientError::AuthExpired(failure),
            _ => ClientError::Api(failure),
        }
    }

    fn transport_failure(&self, error: reqwest::Error) -> ClientError {
        warn!(error = %error, "Request failed without a response");
        self.notify(GENERIC_ERROR_MESSAGE);
        ClientError::Transport(error)
    }

    fn notify(&self, message: &str) {
        let notification = Notification::error(message, self.inner.notification_ttl);
        self.inner.notifications.notify(&notification);
    }

    /// Fire the login redirect once per teardown.
    fn force_login_redirect(&self) {
        if !self.inner.session.claim_redirect() {
            debug!("Login redirect already issued for this session");
            return;
        }
        let redirect = self.inner.redirect.read().clone();
        info!("Forcing login redirect");
        redirect.force_login_redirect();
    }
}
