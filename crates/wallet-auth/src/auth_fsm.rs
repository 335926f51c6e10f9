//! Session state machine using rust-fsm.
//!
//! ## State Diagram
//!
//! ```text
//!                 ┌─────────────────┐
//!     ┌──────────►│    SignedOut    │◄───────────────┐
//!     │           └──┬───────────┬──┘                │
//!     │  LoginAttempt│           │Restore            │
//!     │              ▼           ▼                   │
//!     │   ┌────────────────┐  ┌────────────────┐     │
//!     │   │ Authenticating │  │   Restoring    │─────┤ NoSession / SessionRevoked
//!     │   └───────┬────────┘  └───────┬────────┘     │
//!     │           │LoginSuccess       │Restored      │
//!     │           ▼                   ▼              │
//!     │   ┌─────────────────────────────────┐        │
//!     │   │          Authenticated          │────────┤ SessionRevoked
//!     │   └────┬───────────────────▲────┬───┘        │
//!     │        │TokenExpired       │    │            │
//!     │        ▼                   │    │            │
//!     │   ┌────────────┐ RefreshSuccess │            │
//!     │   │ Refreshing │───────────┘    │            │
//!     │   └──┬──────┬──┘                │            │
//!     │      │      └── RefreshFailed ──┼────────────┘
//!     │      │LogoutRequested           │LogoutRequested
//!     │      ▼                          ▼
//!     │   ┌─────────────────────────────────┐
//!     └───│           SigningOut            │ LogoutComplete
//!         └─────────────────────────────────┘
//! ```

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(SignedOut)

    SignedOut => {
        LoginAttempt => Authenticating,
        Restore => Restoring
    },
    Restoring => {
        Restored => Authenticated,
        // Access token rejected while restoring; the pipeline refreshes it
        TokenExpired => Refreshing,
        NoSession => SignedOut,
        SessionRevoked => SignedOut
    },
    Authenticating => {
        LoginSuccess => Authenticated,
        LoginFailed => SignedOut
    },
    Authenticated => {
        LoginAttempt => Authenticating,
        TokenExpired => Refreshing,
        LogoutRequested => SigningOut,
        SessionRevoked => SignedOut
    },
    Refreshing => {
        RefreshSuccess => Authenticated,
        RefreshFailed => SignedOut,
        LogoutRequested => SigningOut
    },
    SigningOut => {
        LogoutComplete => SignedOut
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Authentication state for external consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    /// No session.
    SignedOut,
    /// Rebuilding the session from persisted tokens.
    Restoring,
    /// Login or registration in progress.
    Authenticating,
    /// Session with a known identity.
    Authenticated,
    /// Exchanging the refresh token for a new access token.
    Refreshing,
    /// Logout in progress.
    SigningOut,
}

impl AuthState {
    /// Returns true only in the Authenticated state.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated)
    }

    /// Returns true if the state is in-progress.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthState::Restoring
                | AuthState::Authenticating
                | AuthState::Refreshing
                | AuthState::SigningOut
        )
    }
}

impl From<&SessionMachineState> for AuthState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::SignedOut => AuthState::SignedOut,
            SessionMachineState::Restoring => AuthState::Restoring,
            SessionMachineState::Authenticating => AuthState::Authenticating,
            SessionMachineState::Authenticated => AuthState::Authenticated,
            SessionMachineState::Refreshing => AuthState::Refreshing,
            SessionMachineState::SigningOut => AuthState::SigningOut,
        }
    }
}

/// Payload for auth state change events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStateChangedPayload {
    /// Current auth state.
    pub state: AuthState,
    /// User ID if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// User email if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticated() -> SessionMachine {
        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::LoginAttempt).unwrap();
        machine.consume(&SessionMachineInput::LoginSuccess).unwrap();
        machine
    }

    #[test]
    fn test_initial_state_is_signed_out() {
        let machine = SessionMachine::new();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_login_flow() {
        let machine = authenticated();
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_login_failure_returns_to_signed_out() {
        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::LoginAttempt).unwrap();
        machine.consume(&SessionMachineInput::LoginFailed).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_relogin_while_authenticated() {
        let mut machine = authenticated();
        machine.consume(&SessionMachineInput::LoginAttempt).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticating);
    }

    #[test]
    fn test_restore_paths() {
        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::Restore).unwrap();
        machine.consume(&SessionMachineInput::Restored).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);

        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::Restore).unwrap();
        machine.consume(&SessionMachineInput::NoSession).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);

        let mut machine = SessionMachine::new();
        machine.consume(&SessionMachineInput::Restore).unwrap();
        machine.consume(&SessionMachineInput::TokenExpired).unwrap();
        machine.consume(&SessionMachineInput::RefreshSuccess).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_refresh_cycle() {
        let mut machine = authenticated();
        machine.consume(&SessionMachineInput::TokenExpired).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Refreshing);

        // A second expiry while refreshing is not a transition
        assert!(machine.consume(&SessionMachineInput::TokenExpired).is_err());

        machine.consume(&SessionMachineInput::RefreshSuccess).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::Authenticated);
    }

    #[test]
    fn test_refresh_failure_signs_out() {
        let mut machine = authenticated();
        machine.consume(&SessionMachineInput::TokenExpired).unwrap();
        machine.consume(&SessionMachineInput::RefreshFailed).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_logout_flow() {
        let mut machine = authenticated();
        machine.consume(&SessionMachineInput::LogoutRequested).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SigningOut);
        machine.consume(&SessionMachineInput::LogoutComplete).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_logout_during_refresh() {
        let mut machine = authenticated();
        machine.consume(&SessionMachineInput::TokenExpired).unwrap();
        machine.consume(&SessionMachineInput::LogoutRequested).unwrap();
        assert_eq!(*machine.state(), SessionMachineState::SigningOut);
    }

    #[test]
    fn test_invalid_transition_returns_error() {
        let mut machine = SessionMachine::new();
        assert!(machine.consume(&SessionMachineInput::LogoutRequested).is_err());
        assert!(machine.consume(&SessionMachineInput::LoginSuccess).is_err());
        assert!(machine.consume(&SessionMachineInput::TokenExpired).is_err());
        assert_eq!(*machine.state(), SessionMachineState::SignedOut);
    }

    #[test]
    fn test_auth_state_flags() {
        assert!(AuthState::Authenticated.is_authenticated());
        assert!(!AuthState::Refreshing.is_authenticated());
        assert!(!AuthState::SignedOut.is_authenticated());

        assert!(!AuthState::SignedOut.is_transient());
        assert!(!AuthState::Authenticated.is_transient());
        assert!(AuthState::Restoring.is_transient());
        assert!(AuthState::Authenticating.is_transient());
        assert!(AuthState::Refreshing.is_transient());
        assert!(AuthState::SigningOut.is_transient());
    }

    #[test]
    fn test_auth_state_conversion() {
        assert_eq!(AuthState::from(&SessionMachineState::SignedOut), AuthState::SignedOut);
        assert_eq!(AuthState::from(&SessionMachineState::Restoring), AuthState::Restoring);
        assert_eq!(AuthState::from(&SessionMachineState::Refreshing), AuthState::Refreshing);
        assert_eq!(AuthState::from(&SessionMachineState::SigningOut), AuthState::SigningOut);
    }

    #[test]
    fn test_auth_state_serializes_snake_case() {
        let payload = AuthStateChangedPayload {
            state: AuthState::SignedOut,
            user_id: None,
            email: None,
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"state":"signed_out"}"#
        );
    }
}
