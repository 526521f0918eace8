//! User-facing notifications: message generation and the outbox the UI
//! drains.

pub mod generator;
pub mod outbox;
