//! Closed dispatch from entity type to merge strategy.

use concord_core::models::{EntityType, FieldValue};

use crate::context::MergeContext;
use crate::strategy::account::ACCOUNT;
use crate::strategy::contact::CONTACT;
use crate::strategy::generic::GENERIC;
use crate::strategy::product::PRODUCT;
use crate::strategy::transaction::TRANSACTION;
use crate::strategy::{FieldPriority, FieldRule, MergeStrategy};

/// Lookup of built-in strategies.
///
/// The set of entity types is closed, so dispatch is a `match`. Types
/// without a table resolve to the generic whole-record LWW strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeRegistry;

impl MergeRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn strategy_for(&self, entity_type: &EntityType) -> &'static MergeStrategy {
        match entity_type {
            EntityType::Account => &ACCOUNT,
            EntityType::Transaction => &TRANSACTION,
            EntityType::Contact => &CONTACT,
            EntityType::Product => &PRODUCT,
            EntityType::Other(_) => &GENERIC,
        }
    }

    pub fn rule_for(&self, entity_type: &EntityType, field: &str) -> FieldRule {
        self.strategy_for(entity_type).rule_for(field)
    }

    pub fn priority_of(&self, entity_type: &EntityType, field: &str) -> FieldPriority {
        self.strategy_for(entity_type).priority_of(field)
    }

    /// Resolve one field with the rule registered for the context's entity
    /// type.
    pub fn resolve(
        &self,
        field: &str,
        local: Option<&FieldValue>,
        remote: Option<&FieldValue>,
        ctx: &MergeContext<'_>,
    ) -> Option<FieldValue> {
        self.rule_for(&ctx.local.entity_type, field)
            .resolver
            .resolve(local, remote, ctx)
    }
}
