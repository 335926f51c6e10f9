//! Notification sink for non-auth failures.
//!
//! The sink is late-bound: a front end registers it after the client is
//! built and may replace or clear it at any time. Notifying without a
//! registered sink is a no-op, and a sink never influences control flow.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Default display lifetime of a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// A user-facing message about a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// How long the front end should keep it visible.
    #[serde(with = "millis")]
    pub life: Duration,
}

impl Notification {
    /// An error notification with the standard "Error" summary.
    pub fn error(detail: impl Into<String>, life: Duration) -> Self {
        Self {
            severity: Severity::Error,
            summary: "Error".to_string(),
            detail: detail.into(),
            life,
        }
    }
}

mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}

/// A surface that presents notifications to the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Holds the currently registered sink, if any.
#[derive(Default)]
pub struct NotificationSlot {
    sink: RwLock<Option<Arc<dyn NotificationSink>>>,
}

impl NotificationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink`, replacing any previous one.
    pub fn register(&self, sink: Arc<dyn NotificationSink>) {
        *self.sink.write() = Some(sink);
    }

    pub fn clear(&self) {
        *self.sink.write() = None;
    }

    pub fn is_registered(&self) -> bool {
        self.sink.read().is_some()
    }

    /// Deliver to the registered sink. Returns false when there is none.
    pub fn notify(&self, notification: &Notification) -> bool {
        // Clone out so the sink runs without the slot locked
        let sink = self.sink.read().clone();
        match sink {
            Some(sink) => {
                sink.notify(notification);
                true
            }
            None => false,
        }
    }
}

/// A sink that records notifications for testing.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded notifications.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Returns the number of recorded notifications.
    pub fn len(&self) -> usize {
        self.notifications.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.notifications.lock().push(notification.clone());
    }
}
