//! Toast notifications.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

const MAX_RETAINED: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "OK",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Bounded queue of toasts. The newest unexpired toast is the one shown.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        if self.items.len() == MAX_RETAINED {
            self.items.pop_front();
        }
        self.items.push_back(notification);
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    /// Newest toast younger than `ttl` at `now`.
    pub fn active(&self, now: DateTime<Utc>, ttl: Duration) -> Option<&Notification> {
        self.items.back().filter(|n| now - n.created_at < ttl)
    }

    /// Drop toasts older than `ttl`.
    pub fn prune(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.items.retain(|n| now - n.created_at < ttl);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_bounded() {
        let mut queue = Notifications::new();
        for i in 0..(MAX_RETAINED + 5) {
            queue.push(Notification::new(NotificationLevel::Info, format!("n{}", i)));
        }
        assert_eq!(queue.len(), MAX_RETAINED);
        assert_eq!(
            queue.latest().map(|n| n.message.as_str()),
            Some(format!("n{}", MAX_RETAINED + 4).as_str())
        );
    }

    #[test]
    fn test_active_respects_ttl() {
        let mut queue = Notifications::new();
        queue.push(Notification::new(NotificationLevel::Error, "boom"));
        let created = queue.latest().map(|n| n.created_at).unwrap_or_else(Utc::now);
        let ttl = Duration::seconds(5);
        assert!(queue.active(created + Duration::seconds(1), ttl).is_some());
        assert!(queue.active(created + Duration::seconds(6), ttl).is_none());
        queue.prune(created + Duration::seconds(6), ttl);
        assert!(queue.is_empty());
    }
}
