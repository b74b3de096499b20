//! Transient user notifications

use std::time::Duration;
use parking_lot::Mutex;
use tracing::{error, info};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A short-lived message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
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

/// Sink for user-facing notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::success(message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::error(message));
    }
}

/// Routes notifications to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(message = %notification.message, "notification"),
            NotificationLevel::Error => error!(message = %notification.message, "notification"),
        }
    }
}

/// Keeps notifications in memory until they are drained.
///
/// Front ends poll it and display each entry for `display_for`.
#[derive(Debug)]
pub struct MemoryNotifier {
    display_for: Duration,
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new(display_for: Duration) -> Self {
        Self {
            display_for,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// How long each entry should stay visible
    pub fn display_for(&self) -> Duration {
        self.display_for
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Copy of everything recorded so far
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(2500))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.entries.lock().push(notification);
    }
}
