//! Typed values stored in a generic record

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store identifier of a record
///
/// Assigned by the store on first save, or generated client-side for
/// embedded records that must be referenced before they are saved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What happens to a referenced record when the record holding the reference is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceAction {
    /// Deleting the holder leaves the referent alone
    NoCascade,
    /// Deleting the holder also deletes the referent
    CascadeDeleteReferent,
}

/// Pointer-by-identifier to another record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: RecordId,
    pub action: ReferenceAction,
}

impl Reference {
    /// A plain pointer with no cascade
    pub fn link(id: RecordId) -> Self {
        Self {
            id,
            action: ReferenceAction::NoCascade,
        }
    }

    /// A pointer to an owned record that is deleted along with its holder
    pub fn owned(id: RecordId) -> Self {
        Self {
            id,
            action: ReferenceAction::CascadeDeleteReferent,
        }
    }

    pub fn cascades(&self) -> bool {
        self.action == ReferenceAction::CascadeDeleteReferent
    }
}

/// Handle to a staged large object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHandle {
    pub path: PathBuf,
}

impl AssetHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A value in a generic record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RecordValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Date(DateTime<Utc>),
    /// Byte blob, held as a staged asset
    Asset(AssetHandle),
    Reference(Reference),
    ReferenceList(Vec<Reference>),
}

impl RecordValue {
    /// Name of the value's variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordValue::Null => "null",
            RecordValue::Bool(_) => "bool",
            RecordValue::Int(_) => "int",
            RecordValue::Double(_) => "double",
            RecordValue::Text(_) => "text",
            RecordValue::Date(_) => "date",
            RecordValue::Asset(_) => "asset",
            RecordValue::Reference(_) => "reference",
            RecordValue::ReferenceList(_) => "reference_list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RecordValue::Null)
    }

    /// Ordering between comparable scalars
    ///
    /// Ints and doubles compare numerically with each other. Anything else
    /// (mismatched types, assets, references) is unordered.
    pub fn compare(&self, other: &RecordValue) -> Option<Ordering> {
        match (self, other) {
            (RecordValue::Bool(a), RecordValue::Bool(b)) => Some(a.cmp(b)),
            (RecordValue::Int(a), RecordValue::Int(b)) => Some(a.cmp(b)),
            (RecordValue::Double(a), RecordValue::Double(b)) => a.partial_cmp(b),
            (RecordValue::Int(a), RecordValue::Double(b)) => (*a as f64).partial_cmp(b),
            (RecordValue::Double(a), RecordValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (RecordValue::Text(a), RecordValue::Text(b)) => Some(a.cmp(b)),
            (RecordValue::Date(a), RecordValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// References held by this value, in order
    pub fn references(&self) -> Vec<&Reference> {
        match self {
            RecordValue::Reference(r) => vec![r],
            RecordValue::ReferenceList(list) => list.iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl From<bool> for RecordValue {
    fn from(v: bool) -> Self {
        RecordValue::Bool(v)
    }
}

impl From<i64> for RecordValue {
    fn from(v: i64) -> Self {
        RecordValue::Int(v)
    }
}

impl From<f64> for RecordValue {
    fn from(v: f64) -> Self {
        RecordValue::Double(v)
    }
}

impl From<&str> for RecordValue {
    fn from(v: &str) -> Self {
        RecordValue::Text(v.to_string())
    }
}

impl From<String> for RecordValue {
    fn from(v: String) -> Self {
        RecordValue::Text(v)
    }
}

impl From<DateTime<Utc>> for RecordValue {
    fn from(v: DateTime<Utc>) -> Self {
        RecordValue::Date(v)
    }
}
