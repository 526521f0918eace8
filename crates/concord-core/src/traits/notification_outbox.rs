use chrono::{DateTime, Utc};

use crate::errors::ConcordResult;
use crate::models::ConflictNotification;

/// Outbox the UI collaborator drains. Delivery is explicit: nothing is
/// pushed to the UI through callbacks.
pub trait INotificationOutbox: Send + Sync {
    fn push(&self, notification: &ConflictNotification) -> ConcordResult<()>;

    /// Undelivered notifications in creation order; marks them delivered.
    fn drain(&self) -> ConcordResult<Vec<ConflictNotification>>;

    fn get(&self, id: &str) -> ConcordResult<Option<ConflictNotification>>;

    fn for_conflict(&self, conflict_id: &str) -> ConcordResult<Vec<ConflictNotification>>;

    /// Notifications not yet dismissed, oldest first.
    fn active(&self) -> ConcordResult<Vec<ConflictNotification>>;

    fn mark_viewed(&self, id: &str, at: DateTime<Utc>) -> ConcordResult<()>;

    fn dismiss(&self, id: &str, at: DateTime<Utc>) -> ConcordResult<()>;

    /// Dismiss every open notification of a conflict. Returns how many.
    fn dismiss_for_conflict(&self, conflict_id: &str, at: DateTime<Utc>) -> ConcordResult<usize>;

    /// Drop notifications created before `now - retention_days`, except
    /// actionable ones that are not dismissed yet.
    fn expire_older_than(&self, retention_days: i64, now: DateTime<Utc>) -> ConcordResult<usize>;
}
