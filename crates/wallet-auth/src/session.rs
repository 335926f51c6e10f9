//! Session state and the operations that create and end it.
//!
//! [`SessionState`] owns the token pair, the identity and the session state
//! machine. It is shared by the request pipeline, which reads the access
//! token before every send and replaces the pair after a refresh.
//! [`SessionStore`] implements login, registration, identity fetch,
//! restore and logout on top of the pipeline.
//!
//! Every token change is written to the vault immediately, so a restart
//! rebuilds the session from what was persisted.

use crate::auth_fsm::{
    AuthState, AuthStateChangedPayload, SessionMachine, SessionMachineInput,
};
use crate::wire::{Credentials, Identity, TokenResponse};
use crate::{ApiClient, ApiRequest, ClientError, ClientResult};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use wallet_storage::{TokenPair, TokenVault};

/// Callback type for auth state change notifications.
pub type AuthStateCallback = Box<dyn Fn(AuthStateChangedPayload) + Send + Sync>;

#[derive(Default)]
struct SessionData {
    tokens: Option<TokenPair>,
    /// Present only while `tokens` is.
    identity: Option<Identity>,
}

/// In-memory session mirrored to durable storage.
pub struct SessionState {
    vault: TokenVault,
    data: Mutex<SessionData>,
    fsm: Mutex<SessionMachine>,
    state_callback: Mutex<Option<AuthStateCallback>>,
    /// Set once the login redirect fired for the current teardown.
    redirected: AtomicBool,
}

impl SessionState {
    /// Load whatever token pair the vault holds.
    pub fn new(vault: TokenVault) -> Self {
        let tokens = match vault.load_token_pair() {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Could not read persisted tokens, starting without a session");
                None
            }
        };
        if tokens.is_some() {
            debug!("Loaded persisted token pair");
        }

        Self {
            vault,
            data: Mutex::new(SessionData {
                tokens,
                identity: None,
            }),
            fsm: Mutex::new(SessionMachine::new()),
            state_callback: Mutex::new(None),
            redirected: AtomicBool::new(false),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.data
            .lock()
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.data
            .lock()
            .tokens
            .as_ref()
            .map(|t| t.refresh_token.clone())
    }

    /// Whether a token pair is held.
    pub fn has_tokens(&self) -> bool {
        self.data.lock().tokens.is_some()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.data.lock().identity.clone()
    }

    /// Current state machine state.
    pub fn state(&self) -> AuthState {
        AuthState::from(self.fsm.lock().state())
    }

    /// Set a callback to be notified of auth state changes.
    pub fn set_state_callback(&self, callback: AuthStateCallback) {
        *self.state_callback.lock() = Some(callback);
    }

    /// Replace the token pair in memory and in the vault.
    pub(crate) fn replace_tokens(&self, pair: &TokenPair) -> ClientResult<()> {
        self.data.lock().tokens = Some(pair.clone());
        self.redirected.store(false, Ordering::SeqCst);
        self.vault.set_token_pair(pair)?;
        Ok(())
    }

    /// Record the identity. Refused when no access token is held.
    pub(crate) fn set_identity(&self, identity: Identity) -> ClientResult<()> {
        let mut data = self.data.lock();
        match &data.tokens {
            Some(tokens) if !tokens.access_token.is_empty() => {
                data.identity = Some(identity);
                Ok(())
            }
            _ => Err(ClientError::NotLoggedIn),
        }
    }

    /// Drop tokens and identity together, then clear the vault.
    pub(crate) fn clear(&self) {
        {
            let mut data = self.data.lock();
            data.tokens = None;
            data.identity = None;
        }
        if let Err(e) = self.vault.clear() {
            warn!(error = %e, "Failed to clear persisted tokens");
        }
    }

    /// True for the first caller after the session was torn down; later
    /// callers get false until new tokens are installed.
    pub(crate) fn claim_redirect(&self) -> bool {
        !self.redirected.swap(true, Ordering::SeqCst)
    }

    /// Clear the session and move to `input`'s target state. Falls back to
    /// SignedOut when `input` is not valid from the current state.
    pub(crate) fn end(&self, input: &SessionMachineInput) {
        self.clear();
        if self.transition(input).is_err() {
            self.force_signed_out();
        }
    }

    /// Transition the FSM and notify callback if state changed.
    pub(crate) fn transition(&self, input: &SessionMachineInput) -> ClientResult<AuthState> {
        let mut fsm = self.fsm.lock();
        let old_state = AuthState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            ClientError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = AuthState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(old_state = ?old_state, new_state = ?new_state, "Auth state transition");
            self.notify_state_change(new_state);
        }

        Ok(new_state)
    }

    /// Like `transition`, for inputs that may legitimately not apply
    /// (e.g. a refresh on a session that was never restored).
    pub(crate) fn transition_quiet(&self, input: &SessionMachineInput) -> Option<AuthState> {
        match self.transition(input) {
            Ok(state) => Some(state),
            Err(e) => {
                debug!(error = %e, "Ignoring auth state input");
                None
            }
        }
    }

    fn force_signed_out(&self) {
        let mut fsm = self.fsm.lock();
        let old_state = AuthState::from(fsm.state());
        *fsm = SessionMachine::new();
        drop(fsm);

        if old_state != AuthState::SignedOut {
            debug!(old_state = ?old_state, "Auth state forced to signed out");
            self.notify_state_change(AuthState::SignedOut);
        }
    }

    fn notify_state_change(&self, state: AuthState) {
        let identity = self.identity();
        let cb = self.state_callback.lock();
        if let Some(callback) = cb.as_ref() {
            callback(AuthStateChangedPayload {
                state,
                user_id: identity.as_ref().map(|i| i.id),
                email: identity.map(|i| i.email),
            });
        }
    }
}

/// Login, registration, identity and logout.
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
}

impl SessionStore {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn state(&self) -> AuthState {
        self.client.session().state()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.client.session().identity()
    }

    /// Whether a token pair is held, whether or not it is still accepted.
    pub fn has_session(&self) -> bool {
        self.client.session().has_tokens()
    }

    /// `POST /auth/login`, then fetch the identity.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Identity> {
        self.authenticate("auth/login", Credentials::new(email, password)).await
    }

    /// `POST /auth/register`, then fetch the identity.
    pub async fn register(&self, email: &str, password: &str) -> ClientResult<Identity> {
        self.authenticate("auth/register", Credentials::new(email, password)).await
    }

    async fn authenticate(&self, path: &str, credentials: Credentials) -> ClientResult<Identity> {
        let session = self.client.session();
        session.transition(&SessionMachineInput::LoginAttempt)?;
        info!(email = %credentials.email, endpoint = path, "Signing in");

        let tokens: TokenResponse = match self.client.post(path, &credentials).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Sign-in rejected");
                session.transition_quiet(&SessionMachineInput::LoginFailed);
                return Err(e);
            }
        };

        if let Err(e) = session.replace_tokens(&tokens.into_pair()) {
            warn!(error = %e, "Failed to persist tokens");
            session.end(&SessionMachineInput::LoginFailed);
            return Err(e);
        }

        let identity = self.fetch_identity().await?;
        session.transition_quiet(&SessionMachineInput::LoginSuccess);
        info!(user_id = identity.id, "Signed in");
        Ok(identity)
    }

    /// `GET /auth/me`. Any failure means the session is unusable, so it is
    /// logged out before the failure is returned.
    pub async fn fetch_identity(&self) -> ClientResult<Identity> {
        match self.client.get::<Identity>("auth/me").await {
            Ok(identity) => {
                self.client.session().set_identity(identity.clone())?;
                debug!(user_id = identity.id, "Identity loaded");
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Could not load identity, signing out");
                self.logout().await;
                Err(e)
            }
        }
    }

    /// Rebuild the session from persisted tokens.
    ///
    /// Returns `Ok(None)` when nothing was persisted, and an error when the
    /// persisted session was rejected (it has been cleared by then).
    pub async fn restore(&self) -> ClientResult<Option<Identity>> {
        let session = self.client.session();
        session.transition(&SessionMachineInput::Restore)?;

        if !session.has_tokens() {
            info!("No persisted session");
            session.transition(&SessionMachineInput::NoSession)?;
            return Ok(None);
        }

        let identity = self.fetch_identity().await?;
        // A refresh during the fetch may already have landed in Authenticated
        session.transition_quiet(&SessionMachineInput::Restored);
        info!(user_id = identity.id, "Session restored");
        Ok(Some(identity))
    }

    /// Revoke the refresh token server-side if possible, then clear the
    /// session. The server call is best-effort; local state is always cleared.
    pub async fn logout(&self) {
        let session = self.client.session();
        session.transition_quiet(&SessionMachineInput::LogoutRequested);

        if let Some(refresh_token) = session.refresh_token() {
            let request =
                ApiRequest::post("auth/logout").json(json!({ "refresh_token": refresh_token }));
            match self.client.execute_unmanaged(request).await {
                Ok(response) if response.is_success() => debug!("Refresh token revoked"),
                Ok(response) => warn!(
                    status = response.status,
                    "Server-side logout failed, clearing local session anyway"
                ),
                Err(e) => warn!(error = %e, "Server-side logout failed, clearing local session anyway"),
            }
        }

        self.client.end_session(&SessionMachineInput::LogoutComplete);
        info!("Signed out");
    }

    /// `PATCH /auth/me/email`. The returned identity replaces the held one.
    pub async fn change_email(&self, current_password: &str, new_email: &str) -> ClientResult<Identity> {
        let identity: Identity = self
            .client
            .patch(
                "auth/me/email",
                &json!({ "current_password": current_password, "new_email": new_email }),
            )
            .await?;
        self.client.session().set_identity(identity.clone())?;
        info!(user_id = identity.id, "Email changed");
        Ok(identity)
    }

    /// `PATCH /auth/me/password`.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> ClientResult<()> {
        self.client
            .patch_no_content(
                "auth/me/password",
                &json!({ "current_password": current_password, "new_password": new_password }),
            )
            .await?;
        info!("Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn identity_requires_tokens() {
        let session = SessionState::new(TokenVault::in_memory());
        let identity = Identity {
            id: 1,
            email: "a@example.com".to_string(),
        };

        assert!(matches!(
            session.set_identity(identity.clone()),
            Err(ClientError::NotLoggedIn)
        ));

        session.replace_tokens(&TokenPair::new("a-1", "r-1")).unwrap();
        session.set_identity(identity.clone()).unwrap();
        assert_eq!(session.identity(), Some(identity));
    }

    #[test]
    fn clear_drops_tokens_and_identity_together() {
        let session = SessionState::new(TokenVault::in_memory());
        session.replace_tokens(&TokenPair::new("a-1", "r-1")).unwrap();
        session
            .set_identity(Identity {
                id: 1,
                email: "a@example.com".to_string(),
            })
            .unwrap();

        session.clear();

        assert_eq!(session.access_token(), None);
        assert_eq!(session.refresh_token(), None);
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn loads_persisted_pair_on_construction() {
        let vault = TokenVault::in_memory();
        vault.set_token_pair(&TokenPair::new("a-1", "r-1")).unwrap();

        let session = SessionState::new(vault);

        assert_eq!(session.access_token().as_deref(), Some("a-1"));
        assert_eq!(session.refresh_token().as_deref(), Some("r-1"));
        assert_eq!(session.state(), AuthState::SignedOut);
    }

    #[test]
    fn state_callback_sees_transitions() {
        let session = SessionState::new(TokenVault::in_memory());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set_state_callback(Box::new(move |payload| sink.lock().push(payload.state)));

        session.transition(&SessionMachineInput::LoginAttempt).unwrap();
        session.transition(&SessionMachineInput::LoginSuccess).unwrap();
        session.end(&SessionMachineInput::SessionRevoked);

        assert_eq!(
            *seen.lock(),
            vec![
                AuthState::Authenticating,
                AuthState::Authenticated,
                AuthState::SignedOut
            ]
        );
    }

    #[test]
    fn end_forces_signed_out_from_any_state() {
        let session = SessionState::new(TokenVault::in_memory());
        session.transition(&SessionMachineInput::LoginAttempt).unwrap();

        // LogoutComplete is not valid from Authenticating
        session.end(&SessionMachineInput::LogoutComplete);

        assert_eq!(session.state(), AuthState::SignedOut);
    }

    #[test]
    fn invalid_transition_is_an_error() {
        let session = SessionState::new(TokenVault::in_memory());
        let err = session
            .transition(&SessionMachineInput::LoginSuccess)
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidStateTransition(_)));
        assert_eq!(session.transition_quiet(&SessionMachineInput::LoginSuccess), None);
    }
}
