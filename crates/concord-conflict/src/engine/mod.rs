//! The conflict engine: detect, resolve, record, notify.
//!
//! Work for one entity is serialized through a per-entity lock; different
//! entities proceed independently. A pending manual conflict blocks only
//! its own entity, and remote updates that arrive meanwhile are queued and
//! handed back once the conflict is settled.

mod locks;
mod outcome;
mod pending;
mod stats;

pub use outcome::{CommitReport, ManualChoice, ManualResolution, PurgeReport, SyncOutcome};
pub use stats::ConflictStats;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use concord_core::config::ConcordConfig;
use concord_core::errors::{ConcordError, ConcordResult};
use concord_core::models::{
    ConflictAuditEvent, ConflictNotification, ConflictRecord, ConflictStatus, EntitySnapshot,
    EntityType, HistoryQuery, RecordResolution, ResolutionStrategy, Severity,
};
use concord_core::traits::{
    IAuditSink, IConflictHistory, IEntityStore, IHierarchyLookup, INotificationOutbox,
    NoHierarchy,
};
use concord_crdt::{MergeContext, MergeEngine};
use concord_observability::events;

use crate::conflict::detection::{ConflictDetector, Detection};
use crate::conflict::history::InMemoryConflictHistory;
use crate::conflict::resolution::AutoResolver;
use crate::notification::generator::NotificationGenerator;
use crate::notification::outbox::InMemoryOutbox;
use locks::EntityLocks;
use pending::{EntityKey, PendingQueue};

/// What `plan` decided, before anything is persisted.
enum Plan {
    /// Nothing to persist.
    Done(SyncOutcome),
    /// Hold the update behind a pending conflict.
    Queue {
        conflict_id: String,
        remote: EntitySnapshot,
    },
    /// A new conflict record (and maybe a notification) to persist.
    Record(SyncOutcome),
}

impl Plan {
    fn snapshot_to_commit(&self) -> Option<&EntitySnapshot> {
        match self {
            Self::Done(o) | Self::Record(o) => o.snapshot_to_commit(),
            Self::Queue { .. } => None,
        }
    }
}

fn key_of(snapshot: &EntitySnapshot) -> EntityKey {
    (snapshot.entity_type.clone(), snapshot.id.clone())
}

pub struct ConflictEngine {
    config: ConcordConfig,
    detector: ConflictDetector,
    resolver: AutoResolver,
    notifier: NotificationGenerator,
    history: Arc<dyn IConflictHistory>,
    outbox: Arc<dyn INotificationOutbox>,
    audit: Option<Arc<dyn IAuditSink>>,
    hierarchy: Arc<dyn IHierarchyLookup>,
    locks: EntityLocks,
    pending: PendingQueue,
}

impl ConflictEngine {
    pub fn new(
        config: ConcordConfig,
        history: Arc<dyn IConflictHistory>,
        outbox: Arc<dyn INotificationOutbox>,
    ) -> Self {
        Self {
            detector: ConflictDetector::new(config.detection.clone()),
            resolver: AutoResolver::new(),
            notifier: NotificationGenerator::new(config.notification.clone()),
            config,
            history,
            outbox,
            audit: None,
            hierarchy: Arc::new(NoHierarchy),
            locks: EntityLocks::default(),
            pending: PendingQueue::default(),
        }
    }

    /// Engine backed by in-memory history and outbox.
    pub fn in_memory(config: ConcordConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryConflictHistory::new()),
            Arc::new(InMemoryOutbox::new()),
        )
    }

    pub fn with_audit(mut self, audit: Arc<dyn IAuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: Arc<dyn IHierarchyLookup>) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn config(&self) -> &ConcordConfig {
        &self.config
    }

    pub fn history(&self) -> &Arc<dyn IConflictHistory> {
        &self.history
    }

    pub fn outbox(&self) -> &Arc<dyn INotificationOutbox> {
        &self.outbox
    }

    /// Pure detection, no side effects.
    pub fn detect(
        &self,
        local: &EntitySnapshot,
        remote: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> Detection {
        self.detector.detect(local, remote, now)
    }

    /// Detection across independent entities in parallel. Results keep the
    /// input order.
    pub fn detect_batch(
        &self,
        pairs: &[(EntitySnapshot, EntitySnapshot)],
        now: DateTime<Utc>,
    ) -> Vec<Detection> {
        pairs
            .par_iter()
            .map(|(local, remote)| self.detector.detect(local, remote, now))
            .collect()
    }

    /// Handle one inbound remote snapshot against the caller's local copy.
    /// Records and notifications are persisted; the entity itself is not
    /// written. See [`ConflictEngine::sync_entity`] for the full path.
    pub fn process_remote(
        &self,
        local: Option<&EntitySnapshot>,
        remote: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> ConcordResult<SyncOutcome> {
        self.locks.with_lock(&key_of(remote), || {
            let plan = self.plan(local, remote, now)?;
            self.commit_plan(plan)
        })
    }

    /// Read local state from `store`, process `remote`, and write the result
    /// with compare-and-set. A stale write re-runs detection against the
    /// fresh local snapshot, up to `resolution.max_cas_retries` times.
    pub fn sync_entity(
        &self,
        store: &dyn IEntityStore,
        remote: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> ConcordResult<SyncOutcome> {
        self.locks
            .with_lock(&key_of(remote), || self.sync_locked(store, remote, now))
    }

    fn sync_locked(
        &self,
        store: &dyn IEntityStore,
        remote: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> ConcordResult<SyncOutcome> {
        let max_retries = self.config.resolution.max_cas_retries;
        let mut attempt = 0;
        loop {
            let local = store.get(&remote.entity_type, &remote.id)?;
            let plan = self.plan(local.as_ref(), remote, now)?;
            if let Some(snapshot) = plan.snapshot_to_commit() {
                let expected = local.as_ref().map(|l| &l.version);
                match store.compare_and_set(expected, snapshot) {
                    Ok(()) => {}
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        events::stale_write_retried(&remote.id, attempt);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
            return self.commit_plan(plan);
        }
    }

    fn plan(
        &self,
        local: Option<&EntitySnapshot>,
        remote: &EntitySnapshot,
        now: DateTime<Utc>,
    ) -> ConcordResult<Plan> {
        if let Some(conflict_id) = self.pending.blocking(&key_of(remote)) {
            return Ok(Plan::Queue {
                conflict_id,
                remote: remote.clone(),
            });
        }
        let Some(local) = local else {
            return Ok(Plan::Done(SyncOutcome::ApplyRemote {
                snapshot: remote.clone(),
            }));
        };

        let conflict = match self.detector.detect(local, remote, now) {
            Detection::Unchanged => return Ok(Plan::Done(SyncOutcome::Unchanged)),
            Detection::KeepLocal => return Ok(Plan::Done(SyncOutcome::KeepLocal)),
            Detection::ApplyRemote => {
                return Ok(Plan::Done(SyncOutcome::ApplyRemote {
                    snapshot: remote.clone(),
                }))
            }
            Detection::Converged => {
                return Ok(Plan::Done(SyncOutcome::Converged {
                    snapshot: MergeEngine::lww_snapshot(local, remote),
                }))
            }
            Detection::Conflict(conflict) => conflict,
        };

        // The same pair delivered again maps to the same record.
        if let Some(existing) = self.history.get(&conflict.id)? {
            return Ok(Plan::Done(match existing.resolved_snapshot.clone() {
                Some(snapshot) => SyncOutcome::AutoResolved {
                    record: existing,
                    snapshot,
                    notification: None,
                },
                None => SyncOutcome::PendingManual {
                    record: existing,
                    notification: None,
                },
            }));
        }

        events::conflict_detected(
            &conflict.id,
            &conflict.entity_type,
            &conflict.entity_id,
            conflict.conflict_type,
            conflict.severity,
            conflict.conflicting_fields.len(),
        );

        let ctx = MergeContext::new(&conflict.local, &conflict.remote)
            .with_hierarchy(self.hierarchy.as_ref());
        let strategy = AutoResolver::policy_for(conflict.severity);
        let outcome = self.resolver.resolve(&conflict, strategy, &ctx);
        let mut record = ConflictRecord::from_conflict(&conflict, outcome.strategy);

        if let Some(snapshot) = outcome.resolved_snapshot {
            record.status = ConflictStatus::AutoResolved;
            record.resolved_snapshot = Some(snapshot.clone());
            record.resolved_at = Some(now);
            let notification = self.notifier.notify(&record, now);
            return Ok(Plan::Record(SyncOutcome::AutoResolved {
                record,
                snapshot,
                notification,
            }));
        }

        match outcome.violation {
            Some(violation) => {
                events::merge_invariant_violation(
                    &conflict.entity_type,
                    &conflict.entity_id,
                    violation.kind(),
                    violation.field(),
                );
                record.severity = Severity::Critical;
                record.violation = Some(violation.to_string());
            }
            None => record.proposed_snapshot = self.resolver.propose(&ctx),
        }
        let notification = self.notifier.notify(&record, now);
        Ok(Plan::Record(SyncOutcome::PendingManual {
            record,
            notification,
        }))
    }

    fn commit_plan(&self, plan: Plan) -> ConcordResult<SyncOutcome> {
        let outcome = match plan {
            Plan::Done(outcome) => return Ok(outcome),
            Plan::Queue {
                conflict_id,
                remote,
            } => {
                let entity_id = remote.id.clone();
                // The pending entry cannot close while the entity lock is held.
                let queue_len = self
                    .pending
                    .enqueue(&key_of(&remote), remote)
                    .unwrap_or_default();
                events::remote_update_queued(&entity_id, queue_len);
                return Ok(SyncOutcome::Queued {
                    conflict_id,
                    queue_len,
                });
            }
            Plan::Record(outcome) => outcome,
        };

        let (record, notification) = match &outcome {
            SyncOutcome::AutoResolved {
                record,
                notification,
                ..
            }
            | SyncOutcome::PendingManual {
                record,
                notification,
            } => (record, notification),
            _ => return Ok(outcome),
        };

        self.history.record(record)?;
        self.emit_audit(record, record.detected_at)?;
        if let Some(n) = notification {
            self.outbox.push(n)?;
            events::notification_emitted(&n.id, &n.conflict_id, n.actionable);
        }
        if record.is_pending() {
            self.pending.open(
                (record.entity_type.clone(), record.entity_id.clone()),
                &record.conflict_id,
            );
            let reason = match record.violation {
                Some(_) => "merge_invariant_violation",
                None => record.conflict_type.as_str(),
            };
            events::conflict_pending_manual(&record.conflict_id, record.severity, reason);
        } else {
            events::conflict_auto_resolved(&record.conflict_id, record.resolution_strategy);
        }
        Ok(outcome)
    }

    /// Settle a pending conflict with the user's choice.
    ///
    /// The returned snapshot dominates both conflicting versions. Queued
    /// remote updates for the entity are released in arrival order and the
    /// conflict's notifications are dismissed.
    pub fn resolve_manually(
        &self,
        conflict_id: &str,
        choice: ManualChoice,
        resolved_by: &str,
        now: DateTime<Utc>,
    ) -> ConcordResult<ManualResolution> {
        let key = self.pending_key(conflict_id)?;
        self.locks.with_lock(&key, || {
            self.resolve_locked(conflict_id, &key, choice, resolved_by, now)
        })
    }

    fn resolve_locked(
        &self,
        conflict_id: &str,
        key: &EntityKey,
        choice: ManualChoice,
        resolved_by: &str,
        now: DateTime<Utc>,
    ) -> ConcordResult<ManualResolution> {
        let record = self.pending_record(conflict_id)?;
        let (chosen, strategy) = match choice {
            ManualChoice::KeepLocal => {
                (record.local_snapshot.clone(), ResolutionStrategy::LocalWins)
            }
            ManualChoice::KeepRemote => {
                (record.remote_snapshot.clone(), ResolutionStrategy::RemoteWins)
            }
            ManualChoice::Custom(snapshot) => (snapshot, ResolutionStrategy::Custom),
        };
        let snapshot = AutoResolver::apply_override(
            &record.local_snapshot,
            &record.remote_snapshot,
            chosen,
            resolved_by,
            now,
        );

        let record = self.history.resolve(
            conflict_id,
            &RecordResolution {
                snapshot: snapshot.clone(),
                strategy,
                status: ConflictStatus::ManuallyResolved,
                resolved_at: now,
                resolved_by: Some(resolved_by.to_string()),
            },
        )?;
        let released = self.close(&record, key, now)?;
        events::conflict_manually_resolved(conflict_id, strategy, resolved_by);

        Ok(ManualResolution {
            record,
            snapshot,
            released,
        })
    }

    /// Dismiss a pending conflict without choosing a side. Commits the merge
    /// computed at detection time, or whole-entity LWW when there is none.
    pub fn dismiss(
        &self,
        conflict_id: &str,
        now: DateTime<Utc>,
    ) -> ConcordResult<ManualResolution> {
        let key = self.pending_key(conflict_id)?;
        self.locks
            .with_lock(&key, || self.dismiss_locked(conflict_id, &key, now))
    }

    fn dismiss_locked(
        &self,
        conflict_id: &str,
        key: &EntityKey,
        now: DateTime<Utc>,
    ) -> ConcordResult<ManualResolution> {
        let record = self.pending_record(conflict_id)?;
        let (snapshot, strategy) = match record.proposed_snapshot.clone() {
            Some(proposed) => (proposed, ResolutionStrategy::AutoMerge),
            None => (
                MergeEngine::lww_snapshot(&record.local_snapshot, &record.remote_snapshot),
                ResolutionStrategy::AutoLww,
            ),
        };

        let mut record = self.history.resolve(
            conflict_id,
            &RecordResolution {
                snapshot: snapshot.clone(),
                strategy,
                status: ConflictStatus::Dismissed,
                resolved_at: now,
                resolved_by: None,
            },
        )?;
        self.history.mark_dismissed(conflict_id)?;
        record.dismissed = true;
        let released = self.close(&record, key, now)?;
        events::conflict_dismissed(conflict_id, strategy);

        Ok(ManualResolution {
            record,
            snapshot,
            released,
        })
    }

    /// [`ConflictEngine::resolve_manually`], then write the result and
    /// replay released updates through `store`.
    pub fn commit_manual(
        &self,
        store: &dyn IEntityStore,
        conflict_id: &str,
        choice: ManualChoice,
        resolved_by: &str,
        now: DateTime<Utc>,
    ) -> ConcordResult<CommitReport> {
        let resolution = self.resolve_manually(conflict_id, choice, resolved_by, now)?;
        self.commit_resolution(store, resolution, now)
    }

    /// [`ConflictEngine::dismiss`], then write the result and replay
    /// released updates through `store`.
    pub fn commit_dismissal(
        &self,
        store: &dyn IEntityStore,
        conflict_id: &str,
        now: DateTime<Utc>,
    ) -> ConcordResult<CommitReport> {
        let resolution = self.dismiss(conflict_id, now)?;
        self.commit_resolution(store, resolution, now)
    }

    /// Write the resolved snapshot over the local version the conflict was
    /// detected against. A local edit made while the user was deciding makes
    /// that write stale; the snapshot then goes through the normal sync path
    /// so the edit is detected, not overwritten.
    fn commit_resolution(
        &self,
        store: &dyn IEntityStore,
        resolution: ManualResolution,
        now: DateTime<Utc>,
    ) -> ConcordResult<CommitReport> {
        let snapshot = &resolution.snapshot;
        let expected = &resolution.record.local_snapshot.version;
        let written = self.locks.with_lock(&key_of(snapshot), || {
            match store.compare_and_set(Some(expected), snapshot) {
                Ok(()) => Ok(true),
                Err(ConcordError::StaleWriteRejected { .. }) => Ok(false),
                Err(e) => Err(e),
            }
        })?;
        let applied = if written {
            SyncOutcome::ApplyRemote {
                snapshot: snapshot.clone(),
            }
        } else {
            events::stale_write_retried(&snapshot.id, 1);
            self.sync_entity(store, snapshot, now)?
        };
        if let SyncOutcome::PendingManual { record, .. } = &applied {
            // Released updates wait behind the new conflict instead.
            let key = key_of(snapshot);
            self.locks.with_lock(&key, || {
                for queued in &resolution.released {
                    self.pending.enqueue(&key, queued.clone());
                }
            });
            return Err(ConcordError::ResolutionNotApplied {
                id: resolution.record.conflict_id.clone(),
                pending: record.conflict_id.clone(),
            });
        }

        let replayed = resolution
            .released
            .iter()
            .map(|queued| self.sync_entity(store, queued, now))
            .collect::<ConcordResult<Vec<_>>>()?;
        Ok(CommitReport {
            resolution,
            applied,
            replayed,
        })
    }

    fn pending_record(&self, conflict_id: &str) -> ConcordResult<ConflictRecord> {
        let record = self
            .history
            .get(conflict_id)?
            .ok_or_else(|| ConcordError::ConflictNotFound {
                id: conflict_id.to_string(),
            })?;
        if !record.is_pending() {
            return Err(ConcordError::NotPending {
                id: conflict_id.to_string(),
            });
        }
        Ok(record)
    }

    fn pending_key(&self, conflict_id: &str) -> ConcordResult<EntityKey> {
        let record = self.pending_record(conflict_id)?;
        Ok((record.entity_type, record.entity_id))
    }

    fn close(
        &self,
        record: &ConflictRecord,
        key: &EntityKey,
        now: DateTime<Utc>,
    ) -> ConcordResult<Vec<EntitySnapshot>> {
        self.outbox.dismiss_for_conflict(&record.conflict_id, now)?;
        self.emit_audit(record, now)?;
        Ok(self.pending.release(key, &record.conflict_id))
    }

    fn emit_audit(&self, record: &ConflictRecord, at: DateTime<Utc>) -> ConcordResult<()> {
        match &self.audit {
            Some(sink) => sink.append(&ConflictAuditEvent::from_record(record, at)),
            None => Ok(()),
        }
    }

    /// Mark a conflict and its notifications as seen.
    pub fn mark_viewed(&self, conflict_id: &str, now: DateTime<Utc>) -> ConcordResult<()> {
        self.history.mark_viewed(conflict_id)?;
        for n in self.outbox.for_conflict(conflict_id)? {
            self.outbox.mark_viewed(&n.id, now)?;
        }
        Ok(())
    }

    /// Hand undelivered notifications to the UI.
    pub fn drain_notifications(&self) -> ConcordResult<Vec<ConflictNotification>> {
        self.outbox.drain()
    }

    pub fn pending_conflicts(&self) -> ConcordResult<Vec<ConflictRecord>> {
        self.history.query(&HistoryQuery {
            status: Some(ConflictStatus::PendingManual),
            ..HistoryQuery::default()
        })
    }

    /// Rebuild the pending index from durable history, e.g. after restart.
    /// Returns the number of entities blocked.
    pub fn restore_pending(&self) -> ConcordResult<usize> {
        for record in self.pending_conflicts()? {
            self.pending
                .open((record.entity_type, record.entity_id), &record.conflict_id);
        }
        Ok(self.pending.open_count())
    }

    /// Remote updates waiting behind a pending conflict for this entity.
    pub fn queued_updates(&self, entity_type: &EntityType, entity_id: &str) -> usize {
        self.pending
            .queued_len(&(entity_type.clone(), entity_id.to_string()))
    }

    /// Apply history retention and notification expiry.
    pub fn purge(&self, now: DateTime<Utc>) -> ConcordResult<PurgeReport> {
        let report = PurgeReport {
            records: self
                .history
                .purge_older_than(self.config.history.retention_days, now)?,
            notifications: self
                .outbox
                .expire_older_than(self.config.notification.retention_days, now)?,
        };
        events::history_purged(report.records, report.notifications);
        Ok(report)
    }

    pub fn stats(&self) -> ConcordResult<ConflictStats> {
        let records = self.history.query(&HistoryQuery::default())?;
        Ok(ConflictStats::from_records(&records, self.pending.open_count()))
    }
}

impl std::fmt::Debug for ConflictEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictEngine")
            .field("config", &self.config)
            .field("pending_entities", &self.pending.open_count())
            .finish_non_exhaustive()
    }
}
