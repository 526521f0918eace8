//! Inputs a resolver may consult beyond the two competing values.

use concord_core::models::EntitySnapshot;
use concord_core::traits::{IHierarchyLookup, NoHierarchy};

/// Both full snapshots plus read access to stored hierarchy, for
/// cross-field and cross-entity decisions.
#[derive(Clone, Copy)]
pub struct MergeContext<'a> {
    pub local: &'a EntitySnapshot,
    pub remote: &'a EntitySnapshot,
    pub hierarchy: &'a dyn IHierarchyLookup,
}

impl<'a> MergeContext<'a> {
    pub fn new(local: &'a EntitySnapshot, remote: &'a EntitySnapshot) -> Self {
        Self {
            local,
            remote,
            hierarchy: &NoHierarchy,
        }
    }

    pub fn with_hierarchy(mut self, hierarchy: &'a dyn IHierarchyLookup) -> Self {
        self.hierarchy = hierarchy;
        self
    }
}

impl std::fmt::Debug for MergeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeContext")
            .field("entity_id", &self.local.id)
            .field("entity_type", &self.local.entity_type)
            .finish_non_exhaustive()
    }
}
