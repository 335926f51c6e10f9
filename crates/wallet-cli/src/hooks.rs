//! Terminal implementations of the client's notification and redirect hooks.

use crate::output::OutputFormat;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use wallet_auth::{LoginRedirect, Notification, NotificationSink};

/// Prints notifications to stderr.
pub struct StderrNotifier {
    format: OutputFormat,
}

impl StderrNotifier {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl NotificationSink for StderrNotifier {
    fn notify(&self, notification: &Notification) {
        match self.format {
            OutputFormat::Text => eprintln!("{}: {}", notification.summary, notification.detail),
            OutputFormat::Json => eprintln!("{}", json!({ "notification": notification })),
        }
    }
}

/// Tells the user to sign in again and remembers that it did.
#[derive(Default)]
pub struct TerminalRedirect {
    triggered: AtomicBool,
}

impl TerminalRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for TerminalRedirect {
    fn force_login_redirect(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            eprintln!("Session expired. Run `wallet login` to sign in again.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_is_sticky() {
        let redirect = TerminalRedirect::new();
        assert!(!redirect.triggered());

        redirect.force_login_redirect();
        redirect.force_login_redirect();
        assert!(redirect.triggered());
    }
}
