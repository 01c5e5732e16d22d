//! User-visible notifications (toasts) emitted by mutations.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for notifications; the console prints them, tests record them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N> Notifier for Arc<N>
where
    N: Notifier + ?Sized,
{
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(text = %notification.message, "notification"),
            NotificationLevel::Error => tracing::warn!(text = %notification.message, "notification"),
        }
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().ok().and_then(|seen| seen.last().cloned())
    }

    /// Drain what has been recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|mut seen| std::mem::take(&mut *seen))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}
