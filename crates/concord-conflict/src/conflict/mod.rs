//! Conflict detection, resolution, and history.

pub mod detection;
pub mod history;
pub mod resolution;
