//! Queued user notifications.
//!
//! Every CRUD action reports its outcome as a [`Notification`]. The controller
//! queues them in a [`NotificationStore`] and the host drains the queue after
//! each action to show them, so each notification is shown once.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a notification is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// Neutral information.
    Info,
    /// An action succeeded.
    Positive,
    /// An action failed.
    Negative,
}

impl NotificationLevel {
    /// Returns the color name a host uses to style the notification.
    pub const fn color(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.color())
    }
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Presentation level.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub text: String,
}

impl Notification {
    /// Creates a notification.
    pub fn new(level: NotificationLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// Returns `true` for [`NotificationLevel::Negative`].
    pub fn is_negative(&self) -> bool {
        self.level == NotificationLevel::Negative
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A queue of notifications, drained by the host.
///
/// # Examples
///
/// ```
/// use crudform_admin::notifications::NotificationStore;
///
/// let mut store = NotificationStore::new();
/// store.positive("Updated Character 3");
/// store.negative("Error deleting: Character(ID:=9) does not exist");
///
/// let shown = store.drain();
/// assert_eq!(shown.len(), 2);
/// assert!(shown[1].is_negative());
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NotificationStore {
    queue: Vec<Notification>,
}

impl NotificationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a notification.
    pub fn push(&mut self, level: NotificationLevel, text: impl Into<String>) {
        self.queue.push(Notification::new(level, text));
    }

    /// Queues an informational notification.
    pub fn info(&mut self, text: impl Into<String>) {
        self.push(NotificationLevel::Info, text);
    }

    /// Queues a success notification.
    pub fn positive(&mut self, text: impl Into<String>) {
        self.push(NotificationLevel::Positive, text);
    }

    /// Queues a failure notification.
    pub fn negative(&mut self, text: impl Into<String>) {
        self.push(NotificationLevel::Negative, text);
    }

    /// Removes and returns all queued notifications, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }

    /// Returns the queued notifications without removing them.
    pub fn peek(&self) -> &[Notification] {
        &self.queue
    }

    /// Returns the most recent notification.
    pub fn last(&self) -> Option<&Notification> {
        self.queue.last()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_color() {
        assert_eq!(NotificationLevel::Info.color(), "info");
        assert_eq!(NotificationLevel::Positive.to_string(), "positive");
        assert_eq!(NotificationLevel::Negative.to_string(), "negative");
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut store = NotificationStore::new();
        store.info("a");
        store.positive("b");
        assert_eq!(store.len(), 2);
        assert_eq!(store.last().unwrap().text, "b");

        let drained = store.drain();
        assert_eq!(drained[0], Notification::new(NotificationLevel::Info, "a"));
        assert!(store.is_empty());
        assert!(store.drain().is_empty());
    }

    #[test]
    fn test_peek_keeps_queue() {
        let mut store = NotificationStore::new();
        store.negative("failed");
        assert_eq!(store.peek().len(), 1);
        assert!(store.peek()[0].is_negative());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_serialize_level() {
        let n = Notification::new(NotificationLevel::Positive, "ok");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["level"], "positive");
        assert_eq!(json["text"], "ok");
    }
}
