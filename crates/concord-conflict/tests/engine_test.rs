//! End-to-end engine behavior: the sync pipeline, manual resolution,
//! dismissal, queueing behind pending conflicts, and retention.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use concord_conflict::{ConflictEngine, ManualChoice, SyncOutcome};
use concord_core::clock::{Causality, VersionVector};
use concord_core::config::ConcordConfig;
use concord_core::errors::{ConcordError, ConcordResult};
use concord_core::models::{
    ConflictAuditEvent, ConflictStatus, ConflictType, EntitySnapshot, EntityType, FieldValue,
    ResolutionStrategy, Severity,
};
use concord_core::traits::{IAuditSink, IConflictHistory, IEntityStore, INotificationOutbox};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn vv(entries: &[(&str, u64)]) -> VersionVector {
    VersionVector::from_entries(entries.iter().map(|(d, n)| (*d, *n)))
}

fn snap(
    entity_type: EntityType,
    id: &str,
    device: &str,
    secs: i64,
    version: VersionVector,
) -> EntitySnapshot {
    EntitySnapshot::new(id, entity_type, device, at(secs)).with_version(version)
}

fn engine() -> ConflictEngine {
    ConflictEngine::in_memory(ConcordConfig::default())
}

#[derive(Default)]
struct MemoryStore {
    entities: Mutex<HashMap<(EntityType, String), EntitySnapshot>>,
    /// Local edit applied right before the next compare-and-set.
    interleave: Mutex<Option<EntitySnapshot>>,
}

impl MemoryStore {
    fn put(&self, snapshot: EntitySnapshot) {
        self.entities.lock().unwrap().insert(
            (snapshot.entity_type.clone(), snapshot.id.clone()),
            snapshot,
        );
    }

    fn load(&self, entity_type: EntityType, id: &str) -> Option<EntitySnapshot> {
        self.entities
            .lock()
            .unwrap()
            .get(&(entity_type, id.to_string()))
            .cloned()
    }
}

impl IEntityStore for MemoryStore {
    fn get(
        &self,
        entity_type: &EntityType,
        entity_id: &str,
    ) -> ConcordResult<Option<EntitySnapshot>> {
        Ok(self.load(entity_type.clone(), entity_id))
    }

    fn compare_and_set(
        &self,
        expected: Option<&VersionVector>,
        snapshot: &EntitySnapshot,
    ) -> ConcordResult<()> {
        if let Some(edit) = self.interleave.lock().unwrap().take() {
            self.put(edit);
        }
        let key = (snapshot.entity_type.clone(), snapshot.id.clone());
        let mut entities = self.entities.lock().unwrap();
        if entities.get(&key).map(|s| &s.version) != expected {
            return Err(ConcordError::StaleWriteRejected {
                entity_id: snapshot.id.clone(),
            });
        }
        entities.insert(key, snapshot.clone());
        Ok(())
    }
}

#[derive(Default)]
struct CountingAudit {
    events: Mutex<Vec<ConflictAuditEvent>>,
    calls: AtomicUsize,
}

impl IAuditSink for CountingAudit {
    fn append(&self, event: &ConflictAuditEvent) -> ConcordResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[test]
fn concurrent_identical_content_merges_vectors_silently() {
    let engine = engine();
    let local = snap(EntityType::Account, "A1", "dev1", 0, vv(&[("dev1", 2), ("dev2", 1)]))
        .with_field("balance", FieldValue::Integer(100));
    let remote = snap(EntityType::Account, "A1", "dev2", 0, vv(&[("dev1", 1), ("dev2", 2)]))
        .with_field("balance", FieldValue::Integer(100));

    let outcome = engine.process_remote(Some(&local), &remote, at(5)).unwrap();
    let SyncOutcome::Converged { snapshot } = outcome else {
        panic!("expected convergence, got {}", outcome.as_str());
    };
    assert_eq!(snapshot.version, vv(&[("dev1", 2), ("dev2", 2)]));
    assert!(engine.drain_notifications().unwrap().is_empty());
    assert_eq!(engine.stats().unwrap().total, 0);
}

#[test]
fn contact_fields_merge_per_field() {
    let engine = engine();
    let local = snap(EntityType::Contact, "C1", "dev1", 100, vv(&[("dev1", 2), ("dev2", 1)]))
        .with_field("name", FieldValue::text("Acme"))
        .with_field("active", FieldValue::Bool(false));
    let remote = snap(EntityType::Contact, "C1", "dev2", 90, vv(&[("dev1", 1), ("dev2", 2)]))
        .with_field("name", FieldValue::text("Acme Corp"))
        .with_field("active", FieldValue::Bool(true));

    let outcome = engine.process_remote(Some(&local), &remote, at(200)).unwrap();
    let SyncOutcome::AutoResolved {
        record,
        snapshot,
        notification,
    } = outcome
    else {
        panic!("expected auto resolution");
    };
    assert_eq!(
        record.conflicting_fields,
        BTreeSet::from(["active".to_string(), "name".to_string()])
    );
    assert_eq!(record.severity, Severity::Medium);
    assert_eq!(record.status, ConflictStatus::AutoResolved);
    assert_eq!(snapshot.field("name"), Some(&FieldValue::text("Acme")));
    assert_eq!(snapshot.field("active"), Some(&FieldValue::Bool(true)));
    assert!(notification.is_none());
    assert_eq!(
        engine.history().get(&record.conflict_id).unwrap().unwrap(),
        record
    );
}

#[test]
fn posted_status_wins_and_flags_for_review() {
    let engine = engine();
    let local = snap(EntityType::Transaction, "T1", "dev1", 10, vv(&[("dev1", 1)]))
        .with_field("status", FieldValue::text("posted"));
    let remote = snap(EntityType::Transaction, "T1", "dev2", 20, vv(&[("dev2", 1)]))
        .with_field("status", FieldValue::text("draft"));

    let outcome = engine.process_remote(Some(&local), &remote, at(30)).unwrap();
    let SyncOutcome::AutoResolved {
        record,
        snapshot,
        notification,
    } = outcome
    else {
        panic!("expected auto resolution");
    };
    assert_eq!(record.severity, Severity::High);
    assert_eq!(snapshot.field("status"), Some(&FieldValue::text("posted")));
    let notification = notification.expect("high severity is surfaced");
    assert!(!notification.actionable);
    let drained = engine.drain_notifications().unwrap();
    assert_eq!(drained.len(), 1);
    assert_eq!(drained[0].id, notification.id);
    assert!(drained[0].delivered);
    assert!(engine.drain_notifications().unwrap().is_empty());
}

fn deletion_pair() -> (EntitySnapshot, EntitySnapshot) {
    let local = snap(EntityType::Contact, "C9", "dev1", 40, vv(&[("dev1", 2), ("dev2", 1)]))
        .with_field("name", FieldValue::text("Globex"))
        .deleted(at(50));
    let remote = snap(EntityType::Contact, "C9", "dev2", 60, vv(&[("dev1", 1), ("dev2", 2)]))
        .with_field("name", FieldValue::text("Globex Ltd"));
    (local, remote)
}

#[test]
fn deletion_against_update_waits_for_user() {
    let engine = engine();
    let (local, remote) = deletion_pair();

    let outcome = engine.process_remote(Some(&local), &remote, at(70)).unwrap();
    let SyncOutcome::PendingManual {
        record,
        notification,
    } = outcome
    else {
        panic!("deletion must never auto-resolve");
    };
    assert_eq!(record.conflict_type, ConflictType::DeleteUpdate);
    assert_eq!(record.severity, Severity::Critical);
    assert!(record.conflicting_fields.contains("_deleted"));
    let notification = notification.unwrap();
    assert!(notification.actionable);
    assert!(notification
        .message
        .contains("was deleted on one device and updated on another"));
    assert!(notification.message.contains("Globex"));
}

#[test]
fn dismissal_commits_best_effort_merge() {
    let engine = engine();
    let (local, remote) = deletion_pair();
    let record = engine
        .process_remote(Some(&local), &remote, at(70))
        .unwrap()
        .record()
        .cloned()
        .unwrap();

    let dismissed = engine.dismiss(&record.conflict_id, at(80)).unwrap();
    assert!(!dismissed.snapshot.is_deleted());
    assert_eq!(
        dismissed.snapshot.field("name"),
        Some(&FieldValue::text("Globex Ltd"))
    );
    assert!(dismissed.record.dismissed);
    assert_eq!(dismissed.record.resolved_by, None);
    assert_eq!(dismissed.record.status, ConflictStatus::Dismissed);

    let stored = engine.history().get(&record.conflict_id).unwrap().unwrap();
    assert!(stored.dismissed);
    assert!(engine.outbox().active().unwrap().is_empty());
    assert!(matches!(
        engine.dismiss(&record.conflict_id, at(90)),
        Err(ConcordError::NotPending { .. })
    ));
}

#[test]
fn manual_choice_dominates_both_sides() {
    let engine = engine();
    let (local, remote) = deletion_pair();
    let id = engine
        .process_remote(Some(&local), &remote, at(70))
        .unwrap()
        .record()
        .unwrap()
        .conflict_id
        .clone();

    let resolution = engine
        .resolve_manually(&id, ManualChoice::KeepLocal, "dev1", at(90))
        .unwrap();
    assert!(resolution.snapshot.is_deleted());
    assert_eq!(resolution.record.resolution_strategy, ResolutionStrategy::LocalWins);
    assert_eq!(resolution.record.resolved_by.as_deref(), Some("dev1"));
    for side in [&local, &remote] {
        assert_eq!(
            side.version.compare(&resolution.snapshot.version),
            Causality::Precedes
        );
    }
    assert!(matches!(
        engine.resolve_manually(&id, ManualChoice::KeepRemote, "dev1", at(95)),
        Err(ConcordError::NotPending { .. })
    ));
    assert!(matches!(
        engine.resolve_manually("missing", ManualChoice::KeepRemote, "dev1", at(95)),
        Err(ConcordError::ConflictNotFound { .. })
    ));
}

fn acme(device: &str, secs: i64, version: VersionVector, name: &str) -> EntitySnapshot {
    snap(EntityType::Account, "A1", device, secs, version).with_field("name", FieldValue::text(name))
}

#[test]
fn manual_choice_repairs_malformed_local_vector() {
    let engine = engine();
    let store = MemoryStore::default();
    store.put(acme("dev1", 10, vv(&[("dev1", 0)]), "Acme"));
    let remote = acme("dev2", 20, vv(&[("dev2", 1)]), "Acme Corp");

    let outcome = engine.sync_entity(&store, &remote, at(30)).unwrap();
    let SyncOutcome::PendingManual { record, .. } = outcome else {
        panic!("malformed vector must fail closed");
    };
    assert_eq!(record.severity, Severity::Critical);

    let report = engine
        .commit_manual(&store, &record.conflict_id, ManualChoice::KeepRemote, "dev1", at(40))
        .unwrap();
    assert!(matches!(report.applied, SyncOutcome::ApplyRemote { .. }));

    let stored = store.load(EntityType::Account, "A1").unwrap();
    assert_eq!(stored.field("name"), Some(&FieldValue::text("Acme Corp")));
    assert_eq!(stored.version, vv(&[("dev1", 1), ("dev2", 1)]));
    assert!(stored.version.validate().is_ok());
    assert!(engine.pending_conflicts().unwrap().is_empty());
}

#[test]
fn blank_remote_device_is_dropped_on_commit() {
    let engine = engine();
    let store = MemoryStore::default();
    store.put(acme("dev1", 10, vv(&[("dev1", 1)]), "Acme"));
    let remote = acme("dev2", 20, vv(&[("dev2", 1), (" ", 1)]), "Acme Corp");

    let id = engine
        .sync_entity(&store, &remote, at(30))
        .unwrap()
        .record()
        .unwrap()
        .conflict_id
        .clone();
    engine.commit_dismissal(&store, &id, at(40)).unwrap();

    let stored = store.load(EntityType::Account, "A1").unwrap();
    assert_eq!(stored.version, vv(&[("dev1", 1), ("dev2", 1)]));
    assert!(engine.pending_conflicts().unwrap().is_empty());
}

#[test]
fn resolution_that_opens_a_new_conflict_is_an_error() {
    let engine = engine();
    let store = MemoryStore::default();
    store.put(acme("dev1", 10, vv(&[("dev1", 0)]), "Acme"));
    let remote = acme("dev2", 20, vv(&[("dev2", 1)]), "Acme Corp");
    let id = engine
        .sync_entity(&store, &remote, at(30))
        .unwrap()
        .record()
        .unwrap()
        .conflict_id
        .clone();

    // The local copy is deleted while the user is deciding.
    *store.interleave.lock().unwrap() =
        Some(acme("dev1", 35, vv(&[("dev1", 1)]), "Acme").deleted(at(35)));
    let err = engine
        .commit_manual(&store, &id, ManualChoice::KeepRemote, "dev3", at(40))
        .unwrap_err();
    let ConcordError::ResolutionNotApplied { id: resolved, pending } = err else {
        panic!("expected ResolutionNotApplied");
    };
    assert_eq!(resolved, id);
    assert_ne!(pending, id);
    assert!(store.load(EntityType::Account, "A1").unwrap().is_deleted());
    let open = engine.pending_conflicts().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].conflict_type, ConflictType::DeleteUpdate);
}

#[test]
fn updates_queue_behind_pending_conflict_and_replay() {
    let engine = engine();
    let store = MemoryStore::default();
    let (local, remote) = deletion_pair();
    store.put(local.clone());

    let outcome = engine.sync_entity(&store, &remote, at(70)).unwrap();
    let id = outcome.record().unwrap().conflict_id.clone();
    assert!(store.load(EntityType::Contact, "C9").unwrap().is_deleted());

    let mut later = remote.clone();
    later
        .fields
        .insert("email".into(), FieldValue::text("ops@globex.io"));
    later.record_edit("dev2", at(75));
    let queued = engine.sync_entity(&store, &later, at(76)).unwrap();
    assert_eq!(
        queued,
        SyncOutcome::Queued {
            conflict_id: id.clone(),
            queue_len: 1
        }
    );
    assert_eq!(engine.queued_updates(&EntityType::Contact, "C9"), 1);

    // Another entity is not blocked.
    let other = snap(EntityType::Contact, "C10", "dev2", 60, vv(&[("dev2", 1)]));
    assert!(matches!(
        engine.sync_entity(&store, &other, at(77)).unwrap(),
        SyncOutcome::ApplyRemote { .. }
    ));

    let report = engine
        .commit_manual(&store, &id, ManualChoice::KeepRemote, "dev1", at(80))
        .unwrap();
    assert!(matches!(report.applied, SyncOutcome::ApplyRemote { .. }));
    assert_eq!(report.resolution.released.len(), 1);
    assert_eq!(report.replayed.len(), 1);
    assert_eq!(engine.queued_updates(&EntityType::Contact, "C9"), 0);

    let stored = store.load(EntityType::Contact, "C9").unwrap();
    assert!(!stored.is_deleted());
    // The queued edit was re-diffed against the resolution, not dropped.
    let SyncOutcome::AutoResolved { record, snapshot, .. } = &report.replayed[0] else {
        panic!("queued edit is concurrent with the resolution");
    };
    assert!(record.conflicting_fields.contains("email"));
    assert_eq!(&stored, snapshot);
}

#[test]
fn stale_write_is_retried_against_fresh_local() {
    let engine = engine();
    let store = MemoryStore::default();
    let local = snap(EntityType::Product, "P1", "dev1", 10, vv(&[("dev1", 1)]))
        .with_field("units_sold", FieldValue::Integer(5));
    store.put(local.clone());

    // The local app edits the product while the remote update is in flight.
    let mut edited = local.clone();
    edited
        .fields
        .insert("units_sold".into(), FieldValue::Integer(9));
    edited.record_edit("dev1", at(20));
    *store.interleave.lock().unwrap() = Some(edited);

    let mut remote = local.clone();
    remote
        .fields
        .insert("units_sold".into(), FieldValue::Integer(7));
    remote.record_edit("dev2", at(15));

    let outcome = engine.sync_entity(&store, &remote, at(30)).unwrap();
    let SyncOutcome::AutoResolved { snapshot, .. } = outcome else {
        panic!("second attempt sees a concurrent edit");
    };
    assert_eq!(snapshot.field("units_sold"), Some(&FieldValue::Integer(9)));
    assert_eq!(store.load(EntityType::Product, "P1").unwrap(), snapshot);
}

#[test]
fn stale_writes_give_up_after_limit() {
    let engine = ConflictEngine::in_memory(ConcordConfig {
        resolution: concord_core::config::ResolutionConfig { max_cas_retries: 0 },
        ..ConcordConfig::default()
    });
    let store = MemoryStore::default();
    let local = snap(EntityType::Product, "P2", "dev1", 10, vv(&[("dev1", 1)]));
    store.put(local.clone());
    let mut edited = local.clone();
    edited.record_edit("dev1", at(20));
    *store.interleave.lock().unwrap() = Some(edited);

    let mut remote = local.clone();
    remote.record_edit("dev2", at(15));
    let err = engine.sync_entity(&store, &remote, at(30)).unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn hierarchy_cycle_escalates_to_manual() {
    struct Parents;
    impl concord_core::traits::IHierarchyLookup for Parents {
        fn parent_of(&self, _: &EntityType, id: &str) -> Option<String> {
            (id == "B").then(|| "A".to_string())
        }
    }
    let engine = engine().with_hierarchy(Arc::new(Parents));
    let local = snap(EntityType::Account, "A", "dev1", 20, vv(&[("dev1", 1)]))
        .with_field("name", FieldValue::text("Assets"))
        .with_field("parent_id", FieldValue::text("B"));
    let remote = snap(EntityType::Account, "A", "dev2", 10, vv(&[("dev2", 1)]))
        .with_field("name", FieldValue::text("Assets"))
        .with_field("parent_id", FieldValue::text("ROOT"));

    let outcome = engine.process_remote(Some(&local), &remote, at(30)).unwrap();
    let SyncOutcome::PendingManual {
        record,
        notification,
    } = outcome
    else {
        panic!("cycle must not be committed");
    };
    assert_eq!(record.severity, Severity::Critical);
    assert!(record.violation.as_deref().unwrap().starts_with("cyclic hierarchy"));
    assert!(record.proposed_snapshot.is_none());
    assert!(notification.unwrap().actionable);

    // Dismissal falls back to whole-entity LWW.
    let dismissed = engine.dismiss(&record.conflict_id, at(40)).unwrap();
    assert_eq!(
        dismissed.record.resolution_strategy,
        ResolutionStrategy::AutoLww
    );
    assert_eq!(
        dismissed.snapshot.field("parent_id"),
        Some(&FieldValue::text("B"))
    );
}

#[test]
fn redelivered_pair_reuses_record() {
    let engine = engine();
    let (local, remote) = deletion_pair();
    let first = engine.process_remote(Some(&local), &remote, at(70)).unwrap();
    let id = first.record().unwrap().conflict_id.clone();

    // While pending, a second delivery waits in line.
    assert!(matches!(
        engine.process_remote(Some(&local), &remote, at(71)).unwrap(),
        SyncOutcome::Queued { queue_len: 1, .. }
    ));

    engine.dismiss(&id, at(75)).unwrap();
    let again = engine.process_remote(Some(&local), &remote, at(76)).unwrap();
    let SyncOutcome::AutoResolved {
        record,
        notification,
        ..
    } = again
    else {
        panic!("settled pair maps to its stored resolution");
    };
    assert_eq!(record.conflict_id, id);
    assert_eq!(record.status, ConflictStatus::Dismissed);
    assert!(notification.is_none());
    assert_eq!(engine.stats().unwrap().total, 1);
    assert_eq!(engine.stats().unwrap().dismissed, 1);
}

#[test]
fn audit_sees_every_record_step() {
    let audit = Arc::new(CountingAudit::default());
    let engine = engine().with_audit(audit.clone());
    let (local, remote) = deletion_pair();
    let id = engine
        .process_remote(Some(&local), &remote, at(70))
        .unwrap()
        .record()
        .unwrap()
        .conflict_id
        .clone();
    engine
        .resolve_manually(&id, ManualChoice::KeepRemote, "user-7", at(80))
        .unwrap();

    assert_eq!(audit.calls.load(Ordering::SeqCst), 2);
    let events = audit.events.lock().unwrap();
    assert_eq!(events[0].status, ConflictStatus::PendingManual);
    assert_eq!(events[1].status, ConflictStatus::ManuallyResolved);
    assert_eq!(events[1].actor.as_deref(), Some("user-7"));
}

#[test]
fn purge_applies_retention_windows() {
    let engine = engine();
    let start = at(0);
    for i in 0..3 {
        let id = format!("T{i}");
        let local = snap(EntityType::Transaction, &id, "dev1", 10, vv(&[("dev1", 1)]))
            .with_field("status", FieldValue::text("posted"));
        let remote = snap(EntityType::Transaction, &id, "dev2", 20, vv(&[("dev2", 1)]))
            .with_field("status", FieldValue::text("draft"));
        engine.process_remote(Some(&local), &remote, start).unwrap();
    }
    let report = engine.purge(start + Duration::days(31)).unwrap();
    assert_eq!(report.records, 0);
    assert_eq!(report.notifications, 3);

    let report = engine.purge(start + Duration::days(91)).unwrap();
    assert_eq!(report.records, 3);
}

#[test]
fn purge_keeps_notifications_of_pending_deletions() {
    let engine = engine();
    let (local, remote) = deletion_pair();
    let start = at(0);
    let id = engine
        .process_remote(Some(&local), &remote, start)
        .unwrap()
        .record()
        .unwrap()
        .conflict_id
        .clone();

    let report = engine.purge(start + Duration::days(31)).unwrap();
    assert_eq!(report.notifications, 0);
    let kept = engine.outbox().for_conflict(&id).unwrap();
    assert_eq!(kept.len(), 1);
    assert!(kept[0].actionable);

    engine.dismiss(&id, start + Duration::days(32)).unwrap();
    let report = engine.purge(start + Duration::days(33)).unwrap();
    assert_eq!(report.notifications, 1);
    assert!(engine.outbox().for_conflict(&id).unwrap().is_empty());
}

#[test]
fn batch_detection_keeps_order() {
    let engine = engine();
    let pairs: Vec<_> = (0..32)
        .map(|i| {
            let id = format!("P{i}");
            let l = snap(EntityType::Product, &id, "dev1", 0, vv(&[("dev1", 1)]));
            let r = if i % 2 == 0 {
                snap(EntityType::Product, &id, "dev2", 0, vv(&[("dev2", 1)]))
                    .with_field("sku", FieldValue::text("X"))
            } else {
                snap(EntityType::Product, &id, "dev1", 0, vv(&[("dev1", 2)]))
            };
            (l, r)
        })
        .collect();
    let detections = engine.detect_batch(&pairs, at(1));
    for (i, d) in detections.iter().enumerate() {
        match d.conflict() {
            Some(c) => {
                assert_eq!(i % 2, 0);
                assert_eq!(c.entity_id, format!("P{i}"));
                assert_eq!(c.severity, Severity::High);
            }
            None => assert_eq!(i % 2, 1),
        }
    }
}

#[test]
fn restore_pending_rebuilds_blocking() {
    let history = Arc::new(concord_conflict::InMemoryConflictHistory::new());
    let outbox = Arc::new(concord_conflict::InMemoryOutbox::new());
    let (local, remote) = deletion_pair();
    let first = ConflictEngine::new(ConcordConfig::default(), history.clone(), outbox.clone());
    first.process_remote(Some(&local), &remote, at(70)).unwrap();

    let restarted = ConflictEngine::new(ConcordConfig::default(), history, outbox);
    assert_eq!(restarted.restore_pending().unwrap(), 1);
    let mut later = remote.clone();
    later.record_edit("dev2", at(90));
    assert!(matches!(
        restarted.process_remote(Some(&local), &later, at(91)).unwrap(),
        SyncOutcome::Queued { queue_len: 1, .. }
    ));
}

#[test]
fn mark_viewed_touches_history_and_notifications() {
    let engine = engine();
    let (local, remote) = deletion_pair();
    let outcome = engine.process_remote(Some(&local), &remote, at(70)).unwrap();
    let id = outcome.record().unwrap().conflict_id.clone();
    engine.mark_viewed(&id, at(72)).unwrap();

    assert!(engine.history().get(&id).unwrap().unwrap().viewed);
    let notes = engine.outbox().for_conflict(&id).unwrap();
    assert_eq!(notes[0].viewed_at, Some(at(72)));
}
