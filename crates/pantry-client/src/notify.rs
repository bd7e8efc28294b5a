//! # Notification Center
//!
//! Transient user-facing messages (toasts).
//!
//! Entries are only ever appended or removed by id. Ids grow monotonically
//! for the life of the process, so a dismissed id is never reused.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Warning => write!(f, "warning"),
        }
    }
}

/// One queued notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Queue of active notifications, shared by every store.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: AtomicU64,
    entries: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a notification and returns its id.
    pub fn notify(&self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let message = message.into();
        debug!(id, %kind, %message, "Notification queued");
        self.entries().push(Notification {
            id,
            kind,
            message,
            created_at: Utc::now(),
        });
        id
    }

    /// Removes the notification with `id`. Returns `false` if there was none.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut entries = self.entries();
        match entries.iter().position(|entry| entry.id == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Active notifications, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        self.entries().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let center = NotificationCenter::new();
        let a = center.notify(NotificationKind::Info, "first");
        let b = center.notify(NotificationKind::Success, "second");
        assert!(b > a);

        assert!(center.dismiss(a));
        let c = center.notify(NotificationKind::Warning, "third");
        assert!(c > b);
    }

    #[test]
    fn test_dismiss_only_removes_matching_id() {
        let center = NotificationCenter::new();
        let a = center.notify(NotificationKind::Error, "Failed to fetch categories");
        let b = center.notify(NotificationKind::Info, "Saved");

        assert!(center.dismiss(a));
        assert!(!center.dismiss(a));
        assert!(!center.dismiss(9_999));

        let remaining = center.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, b);
        assert_eq!(remaining[0].message, "Saved");
    }

    #[test]
    fn test_list_is_oldest_first() {
        let center = NotificationCenter::new();
        center.notify(NotificationKind::Info, "one");
        center.notify(NotificationKind::Info, "two");
        let messages: Vec<String> = center.list().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, vec!["one", "two"]);
        assert!(!center.is_empty());
    }
}
