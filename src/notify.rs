//! Ephemeral status messages with timed expiry.
//!
//! A single slot holds the current notification; each `show` replaces the
//! slot and restarts the expiry window. Because expiry is evaluated against
//! the slot's own timestamp, an older message can never clear a newer one.

use std::time::{Duration, Instant};

/// How long a notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
    shown_at: Instant,
}

impl Notification {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= NOTIFICATION_TTL
    }
}

/// Single-slot notification holder.
#[derive(Debug, Default)]
pub struct Notifications {
    current: Option<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Replace the displayed notification and restart the expiry window.
    pub fn show(&mut self, text: impl Into<String>, severity: Severity, now: Instant) {
        self.current = Some(Notification {
            text: text.into(),
            severity,
            shown_at: now,
        });
    }

    /// The notification still visible at `now`, if any.
    pub fn active(&self, now: Instant) -> Option<&Notification> {
        self.current.as_ref().filter(|n| !n.expired(now))
    }

    /// Drop an expired notification. Returns true if the display changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|n| n.expired(now)) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_expiry_window() {
        let t0 = Instant::now();
        let mut notifications = Notifications::new();
        notifications.show("Saved", Severity::Success, t0);

        let at_1s = notifications.active(t0 + Duration::from_secs(1));
        assert_eq!(at_1s.map(|n| n.text.as_str()), Some("Saved"));

        assert!(notifications.active(t0 + Duration::from_secs(6)).is_none());
    }

    #[test]
    fn test_newer_message_restarts_window() {
        // show A at t=0 and B at t=1: B must still be visible at t=5,
        // where the old per-timer scheme would have cleared it early
        let t0 = Instant::now();
        let mut notifications = Notifications::new();
        notifications.show("A", Severity::Info, t0);
        notifications.show("B", Severity::Info, t0 + Duration::from_secs(1));

        let at_5s = notifications.active(t0 + Duration::from_secs(5));
        assert_eq!(at_5s.map(|n| n.text.as_str()), Some("B"));

        assert!(
            notifications
                .active(t0 + Duration::from_secs(6) + Duration::from_millis(10))
                .is_none()
        );
    }

    #[test]
    fn test_expire_reports_change() {
        let t0 = Instant::now();
        let mut notifications = Notifications::new();
        assert!(!notifications.expire(t0));

        notifications.show("hello", Severity::Info, t0);
        assert!(!notifications.expire(t0 + Duration::from_secs(4)));
        assert!(notifications.expire(t0 + Duration::from_secs(5)));
        assert!(!notifications.expire(t0 + Duration::from_secs(5)));
    }
}
