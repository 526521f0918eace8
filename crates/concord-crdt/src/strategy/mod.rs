//! Per-entity-type merge strategies.
//!
//! A strategy is a static table of field rules plus an optional
//! [`EntityRule`] that sees the whole snapshot pair. Fields not listed in
//! the table merge with last-write-wins at normal priority.

pub mod account;
pub mod contact;
pub mod generic;
pub mod product;
pub mod transaction;

use concord_core::errors::MergeError;
use concord_core::models::EntitySnapshot;
use serde::Serialize;

use crate::context::MergeContext;
use crate::primitives::FieldResolver;

/// How much a conflicting field matters to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPriority {
    /// Presentation only. A conflict limited to these is `low` severity.
    Cosmetic,
    Normal,
    /// Escalates the conflict to `high` severity.
    High,
}

/// Resolver plus priority for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub resolver: FieldResolver,
    pub priority: FieldPriority,
}

impl FieldRule {
    pub const fn new(resolver: FieldResolver, priority: FieldPriority) -> Self {
        Self { resolver, priority }
    }

    pub const fn normal(resolver: FieldResolver) -> Self {
        Self::new(resolver, FieldPriority::Normal)
    }

    pub const fn high(resolver: FieldResolver) -> Self {
        Self::new(resolver, FieldPriority::High)
    }

    pub const fn cosmetic() -> Self {
        Self::new(FieldResolver::LastWriteWins, FieldPriority::Cosmetic)
    }
}

/// Rule applied to unlisted fields.
pub const DEFAULT_FIELD_RULE: FieldRule = FieldRule::normal(FieldResolver::LastWriteWins);

/// Whole-entity logic that spans several fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRule {
    None,
    /// Merged `parent_id` must not close a cycle.
    AccountHierarchy,
    /// Posted, reconciled and voided transactions keep their ledger fields.
    TransactionLifecycle,
}

impl EntityRule {
    /// Fields that must be copied from one side before per-field
    /// resolution, together with the side to copy from.
    pub fn pinned<'a>(
        &self,
        ctx: &MergeContext<'a>,
    ) -> Option<(&'a EntitySnapshot, &'static [&'static str])> {
        match self {
            Self::TransactionLifecycle => transaction::pinned_side(ctx),
            Self::None | Self::AccountHierarchy => None,
        }
    }

    /// Check the merged snapshot. An error aborts automatic resolution.
    pub fn validate(
        &self,
        merged: &EntitySnapshot,
        ctx: &MergeContext<'_>,
    ) -> Result<(), MergeError> {
        match self {
            Self::None => Ok(()),
            Self::AccountHierarchy => account::validate_hierarchy(merged, ctx),
            Self::TransactionLifecycle => transaction::validate_lifecycle(merged, ctx),
        }
    }
}

/// Field table and entity rule for one entity type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MergeStrategy {
    pub name: &'static str,
    pub fields: &'static [(&'static str, FieldRule)],
    pub rule: EntityRule,
}

impl MergeStrategy {
    pub fn rule_for(&self, field: &str) -> FieldRule {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, rule)| *rule)
            .unwrap_or(DEFAULT_FIELD_RULE)
    }

    pub fn priority_of(&self, field: &str) -> FieldPriority {
        self.rule_for(field).priority
    }

    /// Every listed field uses plain last-write-wins.
    pub fn is_whole_record_lww(&self) -> bool {
        self.rule == EntityRule::None
            && self
                .fields
                .iter()
                .all(|(_, r)| r.resolver == FieldResolver::LastWriteWins)
    }
}
