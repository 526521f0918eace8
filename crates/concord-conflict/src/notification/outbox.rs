//! In-memory notification outbox.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use concord_core::errors::{ConcordError, ConcordResult};
use concord_core::models::ConflictNotification;
use concord_core::traits::INotificationOutbox;

/// Notifications in creation order. The UI drains undelivered ones.
#[derive(Debug, Default)]
pub struct InMemoryOutbox {
    notifications: Mutex<Vec<ConflictNotification>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_notification(
        &self,
        id: &str,
        f: impl FnOnce(&mut ConflictNotification),
    ) -> ConcordResult<()> {
        let mut notifications = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        let n = notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| ConcordError::NotificationNotFound { id: id.to_string() })?;
        f(n);
        Ok(())
    }
}

impl INotificationOutbox for InMemoryOutbox {
    fn push(&self, notification: &ConflictNotification) -> ConcordResult<()> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        Ok(())
    }

    fn drain(&self) -> ConcordResult<Vec<ConflictNotification>> {
        let mut notifications = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        let mut drained = Vec::new();
        for n in notifications.iter_mut().filter(|n| !n.delivered) {
            n.delivered = true;
            drained.push(n.clone());
        }
        Ok(drained)
    }

    fn get(&self, id: &str) -> ConcordResult<Option<ConflictNotification>> {
        let notifications = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        Ok(notifications.iter().find(|n| n.id == id).cloned())
    }

    fn for_conflict(&self, conflict_id: &str) -> ConcordResult<Vec<ConflictNotification>> {
        let notifications = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        Ok(notifications
            .iter()
            .filter(|n| n.conflict_id == conflict_id)
            .cloned()
            .collect())
    }

    fn active(&self) -> ConcordResult<Vec<ConflictNotification>> {
        let notifications = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        Ok(notifications
            .iter()
            .filter(|n| !n.is_dismissed())
            .cloned()
            .collect())
    }

    fn mark_viewed(&self, id: &str, at: DateTime<Utc>) -> ConcordResult<()> {
        self.with_notification(id, |n| {
            n.viewed_at.get_or_insert(at);
        })
    }

    fn dismiss(&self, id: &str, at: DateTime<Utc>) -> ConcordResult<()> {
        self.with_notification(id, |n| {
            n.dismissed_at.get_or_insert(at);
        })
    }

    fn dismiss_for_conflict(&self, conflict_id: &str, at: DateTime<Utc>) -> ConcordResult<usize> {
        let mut notifications = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        let mut count = 0;
        for n in notifications
            .iter_mut()
            .filter(|n| n.conflict_id == conflict_id && !n.is_dismissed())
        {
            n.dismissed_at = Some(at);
            count += 1;
        }
        Ok(count)
    }

    fn expire_older_than(&self, retention_days: i64, now: DateTime<Utc>) -> ConcordResult<usize> {
        let cutoff = now - Duration::days(retention_days);
        let mut notifications = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        let before = notifications.len();
        notifications.retain(|n| n.created_at >= cutoff || n.awaits_user());
        Ok(before - notifications.len())
    }
}
