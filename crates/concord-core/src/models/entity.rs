//! Entity snapshots: the versioned records the engine reconciles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::clock::VersionVector;

/// Closed set of entity types with an explicit catch-all.
///
/// Serialized as a lowercase tag. Unknown tags land in `Other` so a typo
/// is visible as a distinct type instead of silently matching nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Account,
    Transaction,
    Contact,
    Product,
    Other(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Account => "account",
            Self::Transaction => "transaction",
            Self::Contact => "contact",
            Self::Product => "product",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Human-facing noun used in notification text.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Account => "account",
            Self::Transaction => "transaction",
            Self::Contact => "contact",
            Self::Product => "product",
            Self::Other(_) => "record",
        }
    }

    /// Fields that carry a human-readable identifier, most preferred first.
    pub fn label_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Account => &["name", "code"],
            Self::Transaction => &["payee", "memo", "reference"],
            Self::Contact => &["name", "email"],
            Self::Product => &["name", "sku"],
            Self::Other(_) => &["name", "title"],
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for EntityType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "account" => Self::Account,
            "transaction" => Self::Transaction,
            "contact" => Self::Contact,
            "product" => Self::Product,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for EntityType {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live or soft-deleted. Every merge path has to handle both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntityState {
    Active,
    Deleted { at: DateTime<Utc> },
}

impl EntityState {
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
    Set(BTreeSet<String>),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Integer(_) => 2,
            Self::Decimal(_) => 3,
            Self::Text(_) => 4,
            Self::Set(_) => 5,
            Self::Timestamp(_) => 6,
        }
    }

    /// Total order over all values, used only as a last-resort tie-break so
    /// that every replica picks the same side.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Set(a), Self::Set(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A versioned record as seen by one replica.
///
/// Field values may be decrypted plaintext. They are never logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: String,
    pub entity_type: EntityType,
    pub version: VersionVector,
    /// Wall-clock time of the last edit. Used only to break ties.
    pub modified_at: DateTime<Utc>,
    /// Device that made the last edit.
    pub modified_by: String,
    pub state: EntityState,
    pub fields: BTreeMap<String, FieldValue>,
}

impl EntitySnapshot {
    /// A fresh live snapshot whose vector records one edit by `device_id`.
    pub fn new(
        id: impl Into<String>,
        entity_type: EntityType,
        device_id: &str,
        modified_at: DateTime<Utc>,
    ) -> Self {
        let mut version = VersionVector::new();
        version.increment(device_id);
        Self {
            id: id.into(),
            entity_type,
            version,
            modified_at,
            modified_by: device_id.to_string(),
            state: EntityState::Active,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn with_version(mut self, version: VersionVector) -> Self {
        self.version = version;
        self
    }

    /// Mark as tombstoned at `at`.
    pub fn deleted(mut self, at: DateTime<Utc>) -> Self {
        self.state = EntityState::Deleted { at };
        self.modified_at = at;
        self
    }

    /// Stamp a local edit: bump the editing device's entry and record who
    /// and when.
    pub fn record_edit(&mut self, device_id: &str, at: DateTime<Utc>) {
        self.version.increment(device_id);
        self.modified_by = device_id.to_string();
        self.modified_at = at;
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn is_deleted(&self) -> bool {
        self.state.is_deleted()
    }

    /// Human-readable identifier taken from the type's label fields.
    pub fn label(&self) -> Option<&str> {
        self.entity_type
            .label_fields()
            .iter()
            .filter_map(|f| self.field(f).and_then(FieldValue::as_text))
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// Names of fields whose values differ between two snapshots. A field
    /// missing on one side counts as different.
    pub fn differing_fields(&self, other: &Self) -> BTreeSet<String> {
        self.fields
            .keys()
            .chain(other.fields.keys())
            .filter(|k| self.fields.get(*k) != other.fields.get(*k))
            .cloned()
            .collect()
    }
}
