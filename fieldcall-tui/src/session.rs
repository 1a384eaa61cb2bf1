//! The signed-in rep's session.
//!
//! Passed explicitly to every component that needs the user identity or
//! raises toasts.

use crate::notifications::{Notification, NotificationLevel, Notifications};
use fieldcall_core::StoreError;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_email: String,
    pub notifications: Notifications,
    active: bool,
}

impl Session {
    pub fn new(user_email: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
            notifications: Notifications::new(),
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark the session ended after a successful sign-out.
    pub fn end(&mut self) {
        self.active = false;
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification::new(level, message));
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Success, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(NotificationLevel::Error, message);
    }

    /// Error toast for a failed store call, prefixed with what was attempted.
    pub fn store_error(&mut self, context: &str, err: &StoreError) {
        tracing::warn!(op = %err.op(), error = %err, "{}", context);
        let message = if err.is_unexpected() {
            err.user_message()
        } else {
            format!("{}: {}", context, err.user_message())
        };
        self.error(message);
    }
}
