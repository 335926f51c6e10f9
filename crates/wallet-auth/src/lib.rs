//! Authentication core for the wallet client.
//!
//! This crate provides:
//! - An HTTP pipeline that attaches bearer tokens and recovers from expired
//!   access tokens with a single-flight refresh
//! - A session store (login, registration, identity, restore, logout) with
//!   tokens persisted through `wallet-storage`
//! - Explicit FSM-based session state
//! - Error payload classification
//! - Late-bound hooks for user notifications and the login redirect

mod auth_fsm;
mod classify;
mod error;
mod navigation;
mod notify;
mod pipeline;
mod refresh;
mod request;
mod session;
mod wire;

#[cfg(test)]
mod tests;

pub use auth_fsm::session_machine;
pub use auth_fsm::{
    AuthState, AuthStateChangedPayload, SessionMachine, SessionMachineInput, SessionMachineState,
};
pub use classify::{
    classify, error_code, is_auth_domain_code, ErrorInfo, AUTH_CODE_PREFIX, GENERIC_ERROR_MESSAGE,
};
pub use error::{ApiFailure, ClientError, ClientResult, RefreshFailure};
pub use navigation::{LoginRedirect, NoopRedirect, RecordingRedirect};
pub use notify::{
    Notification, NotificationSink, NotificationSlot, RecordingNotifier, Severity,
    DEFAULT_NOTIFICATION_TTL,
};
pub use pipeline::{ApiClient, ClientOptions};
pub use refresh::{PendingRefresh, RefreshCoordinator, RefreshGuard, RefreshTicket};
pub use request::{query_pairs, ApiRequest, ApiResponse};
pub use reqwest::Method;
pub use session::{AuthStateCallback, SessionState, SessionStore};
pub use wire::{Credentials, Identity, TokenResponse};
