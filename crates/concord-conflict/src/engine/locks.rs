//! Per-entity mutual exclusion. Different entities never block each other.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use super::pending::EntityKey;

/// Lock table keyed by entity. An entry lives only while some caller holds
/// or waits on its lock.
#[derive(Debug, Default)]
pub(crate) struct EntityLocks {
    locks: DashMap<EntityKey, Arc<Mutex<()>>>,
}

impl EntityLocks {
    /// Run `f` while holding the entity's lock. Callers wrap the whole
    /// detect, resolve and commit sequence.
    pub(crate) fn with_lock<T>(&self, key: &EntityKey, f: impl FnOnce() -> T) -> T {
        let handle = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let out = {
            let _guard = handle.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };
        drop(handle);
        // Handles are cloned under the shard lock, so a count of one means
        // nobody else holds or waits on this entry.
        self.locks.remove_if(key, |_, h| Arc::strong_count(h) == 1);
        out
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.len()
    }
}
