//! Stateless snapshot merge.
//!
//! Combines two concurrent snapshots of the same entity field by field
//! using the registered strategy, then runs the entity rule over the
//! result. The merged vector is the entrywise max of both inputs and is
//! not incremented, so two replicas merging the same pair produce
//! byte-identical snapshots.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use concord_core::errors::MergeError;
use concord_core::models::{EntitySnapshot, EntityState};
use concord_core::VersionVector;
use concord_observability::events;

use crate::context::MergeContext;
use crate::primitives::lww::snapshot_lww_order;
use crate::registry::MergeRegistry;

#[derive(Debug, Default, Clone, Copy)]
pub struct MergeEngine {
    registry: MergeRegistry,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &MergeRegistry {
        &self.registry
    }

    /// Field-level merge of `ctx.local` and `ctx.remote`.
    ///
    /// Snapshots of different entity types cannot be merged field by field;
    /// they get whole-entity LWW.
    pub fn merge(&self, ctx: &MergeContext<'_>) -> Result<EntitySnapshot, MergeError> {
        let (local, remote) = (ctx.local, ctx.remote);
        if local.entity_type != remote.entity_type {
            return Ok(Self::lww_snapshot(local, remote));
        }
        if !local.entity_type.is_known() {
            events::unknown_entity_type(&local.entity_type, &local.id);
        }

        let strategy = self.registry.strategy_for(&local.entity_type);
        let winner = Self::lww_winner(local, remote);
        let mut merged = EntitySnapshot {
            id: local.id.clone(),
            entity_type: local.entity_type.clone(),
            version: merged_vector(local, remote),
            modified_at: local.modified_at.max(remote.modified_at),
            modified_by: winner.modified_by.clone(),
            state: merged_state(local, remote, winner),
            fields: Default::default(),
        };

        let pinned = strategy.rule.pinned(ctx);
        let names: BTreeSet<&String> = local.fields.keys().chain(remote.fields.keys()).collect();
        for name in names {
            let value = match pinned {
                Some((side, fields)) if fields.contains(&name.as_str()) => {
                    side.field(name).cloned()
                }
                _ => strategy.rule_for(name).resolver.resolve(
                    local.field(name),
                    remote.field(name),
                    ctx,
                ),
            };
            if let Some(value) = value {
                merged.fields.insert(name.clone(), value);
            }
        }

        strategy.rule.validate(&merged, ctx)?;
        Ok(merged)
    }

    /// Whole-entity last-write-wins. The merged vector still covers both
    /// inputs.
    pub fn lww_snapshot(local: &EntitySnapshot, remote: &EntitySnapshot) -> EntitySnapshot {
        let mut merged = Self::lww_winner(local, remote).clone();
        merged.version = merged_vector(local, remote);
        merged.modified_at = local.modified_at.max(remote.modified_at);
        merged
    }

    /// The side whole-entity LWW picks.
    pub fn lww_winner<'a>(
        local: &'a EntitySnapshot,
        remote: &'a EntitySnapshot,
    ) -> &'a EntitySnapshot {
        match snapshot_lww_order(local, remote) {
            Ordering::Less => remote,
            _ => local,
        }
    }
}

/// Entrywise max of both vectors, without entries no stored vector may carry.
fn merged_vector(local: &EntitySnapshot, remote: &EntitySnapshot) -> VersionVector {
    let mut version = local.version.merged(&remote.version);
    version.prune();
    version
}

fn merged_state(
    local: &EntitySnapshot,
    remote: &EntitySnapshot,
    winner: &EntitySnapshot,
) -> EntityState {
    match (local.state, remote.state) {
        (EntityState::Active, EntityState::Active) => EntityState::Active,
        (EntityState::Deleted { at: a }, EntityState::Deleted { at: b }) => {
            EntityState::Deleted { at: a.max(b) }
        }
        _ => winner.state,
    }
}
