//! Forced navigation to the login entry point.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Invoked when the session cannot be recovered and the user must sign in again.
pub trait LoginRedirect: Send + Sync {
    fn force_login_redirect(&self);
}

/// A redirect that does nothing.
#[derive(Debug, Default)]
pub struct NoopRedirect;

impl LoginRedirect for NoopRedirect {
    fn force_login_redirect(&self) {}
}

/// A redirect that counts invocations for testing.
#[derive(Debug, Default)]
pub struct RecordingRedirect {
    calls: AtomicUsize,
}

impl RecordingRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn was_called(&self) -> bool {
        self.count() > 0
    }
}

impl LoginRedirect for RecordingRedirect {
    fn force_login_redirect(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
