//! # concord-observability
//!
//! Structured logging for the conflict engine: subscriber setup and one
//! event function per lifecycle step. Events carry ids, types, field names
//! and severities only, never field values.

pub mod tracing_setup;

pub use tracing_setup::{
    events, init_tracing, init_tracing_from_config, init_tracing_with_filter,
};
