//! Turns conflict records into notifications.
//!
//! Messages name the entity kind and its human-readable label, never a raw
//! id on its own, and never field values.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use concord_core::config::NotificationConfig;
use concord_core::models::{ConflictNotification, ConflictRecord, ConflictType};

#[derive(Debug, Clone, Default)]
pub struct NotificationGenerator {
    config: NotificationConfig,
}

impl NotificationGenerator {
    pub fn new(config: NotificationConfig) -> Self {
        Self { config }
    }

    /// Whether the record is surfaced at all. Deletions and anything
    /// waiting on the user always are.
    pub fn should_notify(&self, record: &ConflictRecord) -> bool {
        record.conflict_type.involves_deletion()
            || record.is_pending()
            || record.severity >= self.config.notify_threshold
    }

    /// `None` when the record stays in history only.
    pub fn notify(
        &self,
        record: &ConflictRecord,
        now: DateTime<Utc>,
    ) -> Option<ConflictNotification> {
        if !self.should_notify(record) {
            return None;
        }
        let actionable = record.is_pending()
            || record.conflict_type.involves_deletion()
            || record.violation.is_some();
        let (title, message) = compose(record);
        Some(ConflictNotification {
            id: Uuid::new_v4().to_string(),
            conflict_id: record.conflict_id.clone(),
            entity_type: record.entity_type.clone(),
            entity_id: record.entity_id.clone(),
            severity: record.severity,
            title,
            message,
            created_at: now,
            actionable,
            delivered: false,
            viewed_at: None,
            dismissed_at: None,
        })
    }
}

/// `the contact "Acme"`, or `an untitled contact` when no label field is
/// set on either side.
fn subject(record: &ConflictRecord) -> String {
    let noun = record.entity_type.display_name();
    let label = record
        .local_snapshot
        .label()
        .or_else(|| record.remote_snapshot.label());
    match label {
        Some(label) => format!("the {noun} \"{label}\""),
        None => format!("an untitled {noun}"),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn field_list(record: &ConflictRecord) -> String {
    record
        .conflicting_fields
        .iter()
        .filter(|f| !f.starts_with('_'))
        .map(|f| f.replace('_', " "))
        .collect::<Vec<_>>()
        .join(", ")
}

fn compose(record: &ConflictRecord) -> (String, String) {
    let subject = subject(record);
    let noun = record.entity_type.display_name();

    if record.conflict_type.involves_deletion() {
        return (
            format!("Deleted {noun} was edited elsewhere"),
            format!(
                "{} was deleted on one device and updated on another. \
                 Nothing has been lost yet. Choose which version to keep.",
                capitalize(&subject)
            ),
        );
    }
    if record.conflict_type == ConflictType::TypeMismatch {
        return (
            "Two devices disagree about a record".to_string(),
            format!(
                "{} was saved as a different kind of record on another device. \
                 Please choose the version that is correct.",
                capitalize(&subject)
            ),
        );
    }
    if record.violation.is_some() {
        return (
            format!("Changes to a {noun} need your review"),
            format!(
                "{} was changed on two devices in ways that can't be combined \
                 without breaking it. Take a look at both versions and choose one.",
                capitalize(&subject)
            ),
        );
    }
    if record.is_pending() {
        return (
            format!("Changes to a {noun} need your review"),
            format!(
                "{} was edited on two devices ({}). Take your time to compare \
                 both versions and choose which to keep.",
                capitalize(&subject),
                field_list(record)
            ),
        );
    }
    (
        format!("We combined changes to a {noun}"),
        format!(
            "{} was edited on two devices ({}). The changes were combined \
             automatically. You can review the result whenever you like.",
            capitalize(&subject),
            field_list(record)
        ),
    )
}
