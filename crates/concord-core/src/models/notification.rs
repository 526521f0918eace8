//! User-facing conflict notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conflict::Severity;
use super::entity::EntityType;

/// A message for the UI collaborator, delivered through an outbox.
///
/// Lifecycle: created → (viewed) → dismissed or expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictNotification {
    pub id: String,
    pub conflict_id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// The user has to choose a side.
    pub actionable: bool,
    /// Handed to the UI by an outbox drain.
    pub delivered: bool,
    pub viewed_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl ConflictNotification {
    pub fn is_dismissed(&self) -> bool {
        self.dismissed_at.is_some()
    }

    /// Actionable and still open. Expiry never removes these.
    pub fn awaits_user(&self) -> bool {
        self.actionable && !self.is_dismissed()
    }
}
