//! Generic record: type tag, identifier, ordered fields

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::{RecordId, RecordValue, Reference};

/// Store-agnostic keyed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericRecord {
    record_type: String,
    id: Option<RecordId>,
    fields: Vec<(String, RecordValue)>,
    /// Set by the store on save
    #[serde(default)]
    modified_at: Option<DateTime<Utc>>,
}

impl GenericRecord {
    /// Create an empty, unsaved record of the given type
    pub fn new(record_type: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            id: None,
            fields: Vec::new(),
            modified_at: None,
        }
    }

    /// Create an empty record with a known identifier
    pub fn with_id(record_type: impl Into<String>, id: RecordId) -> Self {
        Self {
            id: Some(id),
            ..Self::new(record_type)
        }
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.modified_at
    }

    pub fn set_modified_at(&mut self, at: DateTime<Utc>) {
        self.modified_at = Some(at);
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&RecordValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Set a field, replacing any existing value under the same name in place
    pub fn set(&mut self, name: impl Into<String>, value: RecordValue) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<RecordValue> {
        let pos = self.fields.iter().position(|(key, _)| key == name)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every reference held by any field
    pub fn references(&self) -> Vec<&Reference> {
        self.fields
            .iter()
            .flat_map(|(_, value)| value.references())
            .collect()
    }
}
