//! Per-entity queue of remote updates held back by a pending conflict.

use std::collections::VecDeque;

use dashmap::DashMap;

use concord_core::models::{EntitySnapshot, EntityType};

pub(crate) type EntityKey = (EntityType, String);

#[derive(Debug)]
struct PendingEntry {
    conflict_id: String,
    queued: VecDeque<EntitySnapshot>,
}

/// Open pending conflicts by entity, each with its FIFO of held updates.
#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    entries: DashMap<EntityKey, PendingEntry>,
}

impl PendingQueue {
    pub(crate) fn open(&self, key: EntityKey, conflict_id: &str) {
        self.entries.entry(key).or_insert_with(|| PendingEntry {
            conflict_id: conflict_id.to_string(),
            queued: VecDeque::new(),
        });
    }

    /// Conflict id holding the entity, if any.
    pub(crate) fn blocking(&self, key: &EntityKey) -> Option<String> {
        self.entries.get(key).map(|e| e.conflict_id.clone())
    }

    /// Append an update behind the pending conflict. Returns the queue
    /// length, or `None` if nothing is pending for the entity.
    pub(crate) fn enqueue(&self, key: &EntityKey, snapshot: EntitySnapshot) -> Option<usize> {
        self.entries.get_mut(key).map(|mut e| {
            e.queued.push_back(snapshot);
            e.queued.len()
        })
    }

    /// Close the entity's pending conflict and hand back held updates.
    pub(crate) fn release(&self, key: &EntityKey, conflict_id: &str) -> Vec<EntitySnapshot> {
        match self.entries.remove_if(key, |_, e| e.conflict_id == conflict_id) {
            Some((_, entry)) => entry.queued.into_iter().collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn queued_len(&self, key: &EntityKey) -> usize {
        self.entries.get(key).map_or(0, |e| e.queued.len())
    }

    pub(crate) fn open_count(&self) -> usize {
        self.entries.len()
    }
}
