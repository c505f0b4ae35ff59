//! Transient user-facing notifications.
//!
//! Two independent channels - success and error - each holding at most one
//! notice at a time. A new notice replaces the channel's previous one; a
//! notice disappears only when replaced or explicitly dismissed. Both
//! channels may be occupied at once.

use std::sync::Mutex;

use uuid::Uuid;

/// Channel a notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Confirmations and informational messages.
    Success,
    /// Failures the user should act on.
    Error,
}

/// A single dismissible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Identity used for dismissal.
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Default)]
struct Channels {
    success: Option<Notice>,
    error: Option<Notice>,
}

/// Holder of the two notification channels.
#[derive(Debug, Default)]
pub struct Notifier {
    channels: Mutex<Channels>,
}

impl Notifier {
    /// An empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a success notice, replacing the channel's previous one.
    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.publish(NoticeLevel::Success, message.into())
    }

    /// Publish an error notice, replacing the channel's previous one.
    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.publish(NoticeLevel::Error, message.into())
    }

    fn publish(&self, level: NoticeLevel, message: String) -> Uuid {
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            message,
        };
        let id = notice.id;
        let mut channels = self.lock();
        match level {
            NoticeLevel::Success => channels.success = Some(notice),
            NoticeLevel::Error => channels.error = Some(notice),
        }
        id
    }

    /// Currently visible notices, success channel first.
    pub fn active(&self) -> Vec<Notice> {
        let channels = self.lock();
        channels
            .success
            .iter()
            .chain(channels.error.iter())
            .cloned()
            .collect()
    }

    /// Dismiss one notice by id. Returns whether anything was dismissed.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut channels = self.lock();
        if channels.success.as_ref().is_some_and(|n| n.id == id) {
            channels.success = None;
            return true;
        }
        if channels.error.as_ref().is_some_and(|n| n.id == id) {
            channels.error = None;
            return true;
        }
        false
    }

    /// Take every visible notice, leaving both channels empty.
    pub fn drain(&self) -> Vec<Notice> {
        let mut channels = self.lock();
        channels
            .success
            .take()
            .into_iter()
            .chain(channels.error.take())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Channels> {
        // A poisoned lock only means a panic mid-publish; the notice data
        // itself is still consistent.
        self.channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
