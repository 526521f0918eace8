//! Structured log events for the conflict lifecycle.
//!
//! Each function emits a `tracing` event with structured fields.

use concord_core::models::{ConflictType, EntityType, ResolutionStrategy, Severity};

/// Log a classified conflict.
pub fn conflict_detected(
    conflict_id: &str,
    entity_type: &EntityType,
    entity_id: &str,
    conflict_type: ConflictType,
    severity: Severity,
    field_count: usize,
) {
    tracing::info!(
        event = "conflict_detected",
        conflict_id = %conflict_id,
        entity_type = %entity_type,
        entity_id = %entity_id,
        conflict_type = %conflict_type,
        severity = %severity,
        field_count = field_count,
        "conflict detected"
    );
}

/// Log an automatic resolution.
pub fn conflict_auto_resolved(conflict_id: &str, strategy: ResolutionStrategy) {
    tracing::info!(
        event = "conflict_auto_resolved",
        conflict_id = %conflict_id,
        strategy = %strategy,
        "conflict auto-resolved"
    );
}

/// Log a conflict parked for the user.
pub fn conflict_pending_manual(conflict_id: &str, severity: Severity, reason: &str) {
    tracing::warn!(
        event = "conflict_pending_manual",
        conflict_id = %conflict_id,
        severity = %severity,
        reason = %reason,
        "conflict requires manual resolution"
    );
}

/// Log a user-chosen resolution.
pub fn conflict_manually_resolved(
    conflict_id: &str,
    strategy: ResolutionStrategy,
    resolved_by: &str,
) {
    tracing::info!(
        event = "conflict_manually_resolved",
        conflict_id = %conflict_id,
        strategy = %strategy,
        resolved_by = %resolved_by,
        "conflict manually resolved"
    );
}

/// Log a dismissal that committed the best-effort fallback.
pub fn conflict_dismissed(conflict_id: &str, fallback: ResolutionStrategy) {
    tracing::info!(
        event = "conflict_dismissed",
        conflict_id = %conflict_id,
        fallback = %fallback,
        "conflict dismissed"
    );
}

/// Log a custom merger rejecting a merged state. Only the rule kind and the
/// guarded field name are logged; the full reason stays on the record.
pub fn merge_invariant_violation(
    entity_type: &EntityType,
    entity_id: &str,
    kind: &str,
    field: Option<&str>,
) {
    tracing::warn!(
        event = "merge_invariant_violation",
        entity_type = %entity_type,
        entity_id = %entity_id,
        kind = %kind,
        field = field,
        "merge invariant violated, escalating to manual"
    );
}

/// Log a compare-and-set retry.
pub fn stale_write_retried(entity_id: &str, attempt: u32) {
    tracing::debug!(
        event = "stale_write_retried",
        entity_id = %entity_id,
        attempt = attempt,
        "stale write rejected, re-running detection"
    );
}

/// Log a merge that fell back to whole-record LWW for an unknown type.
pub fn unknown_entity_type(entity_type: &EntityType, entity_id: &str) {
    tracing::warn!(
        event = "unknown_entity_type",
        entity_type = %entity_type,
        entity_id = %entity_id,
        "no merge strategy for entity type, using last-write-wins"
    );
}

/// Log a vector that failed validation.
pub fn malformed_vector(entity_id: &str, reason: &str) {
    tracing::warn!(
        event = "malformed_vector",
        entity_id = %entity_id,
        reason = %reason,
        "malformed version vector, failing closed"
    );
}

/// Log a notification placed in the outbox.
pub fn notification_emitted(notification_id: &str, conflict_id: &str, actionable: bool) {
    tracing::info!(
        event = "notification_emitted",
        notification_id = %notification_id,
        conflict_id = %conflict_id,
        actionable = actionable,
        "conflict notification emitted"
    );
}

/// Log a remote update parked behind a pending conflict.
pub fn remote_update_queued(entity_id: &str, queue_len: usize) {
    tracing::info!(
        event = "remote_update_queued",
        entity_id = %entity_id,
        queue_len = queue_len,
        "remote update queued behind pending conflict"
    );
}

/// Log retention cleanup.
pub fn history_purged(records: usize, notifications: usize) {
    tracing::info!(
        event = "history_purged",
        records = records,
        notifications = notifications,
        "conflict history purged"
    );
}
