//! Version vector for causal ordering between devices.
//!
//! Each device owns exactly one entry and only ever increments it. Merge is
//! the entrywise maximum. Missing entries read as zero, so vectors of
//! different shapes always compare without error.
//!
//! # Examples
//!
//! ```
//! use concord_core::{Causality, VersionVector};
//!
//! let mut a = VersionVector::new();
//! a.increment("dev1");
//! a.increment("dev1");
//!
//! let mut b = VersionVector::new();
//! b.increment("dev2");
//!
//! assert_eq!(a.compare(&b), Causality::Concurrent);
//!
//! a.merge(&b);
//! assert_eq!(a.get("dev1"), 2);
//! assert_eq!(a.get("dev2"), 1);
//! assert_eq!(a.compare(&b), Causality::Follows);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{ConcordError, ConcordResult};

/// Causal relationship of one vector relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Causality {
    /// Every entry matches.
    Equal,
    /// `self` happened before `other`.
    Precedes,
    /// `self` happened after `other`.
    Follows,
    /// Neither side has seen the other's latest edit.
    Concurrent,
}

impl Causality {
    /// The relation seen from the other side: `Precedes` ↔ `Follows`.
    pub fn inverse(self) -> Self {
        match self {
            Self::Precedes => Self::Follows,
            Self::Follows => Self::Precedes,
            other => other,
        }
    }
}

/// Device id → monotonically increasing logical clock.
///
/// Backed by a `BTreeMap` so serialization and hashing are stable across
/// replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionVector {
    clocks: BTreeMap<String, u64>,
}

impl VersionVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from `(device, clock)` pairs. Later duplicates win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            clocks: entries.into_iter().map(|(d, c)| (d.into(), c)).collect(),
        }
    }

    /// Increment the entry owned by `device_id` by one.
    ///
    /// The device id is always passed explicitly; there is no ambient
    /// "current device".
    pub fn increment(&mut self, device_id: &str) {
        let entry = self.clocks.entry(device_id.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
    }

    /// Clock value for a device (0 if absent).
    pub fn get(&self, device_id: &str) -> u64 {
        self.clocks.get(device_id).copied().unwrap_or(0)
    }

    /// Merge with another vector: entrywise max.
    pub fn merge(&mut self, other: &Self) {
        for (device_id, &other_val) in &other.clocks {
            let entry = self.clocks.entry(device_id.clone()).or_insert(0);
            *entry = (*entry).max(other_val);
        }
    }

    /// Non-mutating merge.
    pub fn merged(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.merge(other);
        out
    }

    /// Classify `self` relative to `other`. O(|devices|), never fails.
    pub fn compare(&self, other: &Self) -> Causality {
        let mut less = false;
        let mut greater = false;

        for device_id in self.clocks.keys().chain(other.clocks.keys()) {
            let a = self.get(device_id);
            let b = other.get(device_id);
            if a < b {
                less = true;
            } else if a > b {
                greater = true;
            }
            if less && greater {
                return Causality::Concurrent;
            }
        }

        match (less, greater) {
            (false, false) => Causality::Equal,
            (true, false) => Causality::Precedes,
            (false, true) => Causality::Follows,
            (true, true) => Causality::Concurrent,
        }
    }

    /// Returns true if `self` happened before `other`.
    pub fn happens_before(&self, other: &Self) -> bool {
        self.compare(other) == Causality::Precedes
    }

    /// Returns true if `self` strictly dominates `other`.
    pub fn dominates(&self, other: &Self) -> bool {
        self.compare(other) == Causality::Follows
    }

    /// Returns true if neither vector has seen the other.
    pub fn concurrent_with(&self, other: &Self) -> bool {
        self.compare(other) == Causality::Concurrent
    }

    /// Device ids present in this vector, in sorted order.
    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.clocks.keys().map(String::as_str)
    }

    /// `(device, clock)` pairs in sorted order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> {
        self.clocks.iter().map(|(d, c)| (d.as_str(), *c))
    }

    /// Number of devices tracked.
    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    /// Returns true if no device has an entry.
    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// Drop zero clocks and blank device ids. Comparison is unaffected by
    /// zero entries; a blank id cannot be owned by any device.
    pub fn prune(&mut self) {
        self.clocks.retain(|d, c| *c > 0 && !d.trim().is_empty());
    }

    /// Check the structure a persisted snapshot's vector must have.
    ///
    /// A stored edit always carries at least one non-zero entry and every
    /// device id is a non-blank string.
    pub fn validate(&self) -> ConcordResult<()> {
        if self.clocks.values().all(|&c| c == 0) {
            return Err(ConcordError::MalformedVector {
                reason: "vector has no non-zero entry".to_string(),
            });
        }
        if let Some(bad) = self.clocks.keys().find(|d| d.trim().is_empty()) {
            return Err(ConcordError::MalformedVector {
                reason: format!("blank device id {bad:?}"),
            });
        }
        Ok(())
    }

    /// Parse a vector received as JSON. Negative or fractional clocks and
    /// non-object payloads are reported as `MalformedVector`.
    pub fn from_json(raw: &str) -> ConcordResult<Self> {
        serde_json::from_str(raw).map_err(|e| ConcordError::MalformedVector {
            reason: e.to_string(),
        })
    }
}

/// Free-function form of [`VersionVector::compare`].
pub fn compare(a: &VersionVector, b: &VersionVector) -> Causality {
    a.compare(b)
}
