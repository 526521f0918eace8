//! # concord-crdt
//!
//! Entity-aware merge of concurrently edited snapshots.
//!
//! ## Field Resolvers
//!
//! - [`FieldResolver::LastWriteWins`]: later edit wins, deterministic tie-break
//! - [`FieldResolver::Max`]: numeric/ordinal max
//! - [`FieldResolver::Union`]: set union, additions are never dropped
//! - [`FieldResolver::LogicalOr`]: sticky-true booleans
//! - [`FieldResolver::Sticky`]: terminal values win regardless of timestamps
//!
//! ## Higher-Level Structures
//!
//! - [`MergeStrategy`]: per-entity-type field table plus an [`EntityRule`]
//! - [`MergeRegistry`]: closed dispatch from [`EntityType`](concord_core::EntityType) to strategy
//! - [`MergeEngine`]: stateless snapshot merge and whole-entity LWW
//!
//! ## Guarantees
//!
//! Every resolver picks the same value for `(local, remote)` and
//! `(remote, local)`, and merging a snapshot with itself returns it
//! unchanged, so replicas that merge the same pair converge.

pub mod context;
pub mod merge_engine;
pub mod primitives;
pub mod registry;
pub mod strategy;

// Re-export public API
pub use context::MergeContext;
pub use merge_engine::MergeEngine;
pub use primitives::{lww_order, snapshot_lww_order, FieldResolver};
pub use registry::MergeRegistry;
pub use strategy::{EntityRule, FieldPriority, FieldRule, MergeStrategy};
