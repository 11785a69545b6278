//! Typed field values exchanged between mapped types and the codec

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::{construct, Mapped};
use crate::record::RecordId;

/// Value of one field on the typed side of the mapping
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Date(DateTime<Utc>),
    Bytes(Vec<u8>),
    /// Local path whose content is stored on encode; decodes as `Bytes`
    File(PathBuf),
    Link(RecordId),
    Embedded(Box<FieldSet>),
    EmbeddedList(Vec<FieldSet>),
}

impl FieldValue {
    /// Embed another mapped value
    pub fn embed<M: Mapped>(item: &M) -> Self {
        FieldValue::Embedded(Box::new(item.to_fields()))
    }

    /// Embed a homogeneous list of mapped values
    pub fn embed_all<M: Mapped>(items: &[M]) -> Self {
        FieldValue::EmbeddedList(items.iter().map(Mapped::to_fields).collect())
    }

    /// Pointer to another record, or null when absent
    pub fn link(id: Option<RecordId>) -> Self {
        id.map_or(FieldValue::Null, FieldValue::Link)
    }

    /// Convert an optional value, mapping `None` to null
    pub fn optional<V: Into<FieldValue>>(value: Option<V>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Date(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<PathBuf> for FieldValue {
    fn from(v: PathBuf) -> Self {
        FieldValue::File(v)
    }
}

/// Ordered field bag for one record, handed to [`Mapped::from_fields`]
///
/// `take_*` accessors remove the field and return it only if it has the
/// expected variant.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    record_type: String,
    id: Option<RecordId>,
    values: Vec<(String, FieldValue)>,
}

impl FieldSet {
    pub fn new(record_type: impl Into<String>, id: Option<RecordId>) -> Self {
        Self {
            record_type: record_type.into(),
            id,
            values: Vec::new(),
        }
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn set_record_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Insert or replace a value
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if let Some(slot) = self.values.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value;
        } else {
            self.values.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Whether a non-null value is present
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn take(&mut self, name: &str) -> Option<FieldValue> {
        let pos = self.values.iter().position(|(key, _)| key == name)?;
        Some(self.values.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn into_parts(self) -> (String, Option<RecordId>, Vec<(String, FieldValue)>) {
        (self.record_type, self.id, self.values)
    }

    pub fn take_bool(&mut self, name: &str) -> Option<bool> {
        match self.take(name)? {
            FieldValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_int(&mut self, name: &str) -> Option<i64> {
        match self.take(name)? {
            FieldValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_double(&mut self, name: &str) -> Option<f64> {
        match self.take(name)? {
            FieldValue::Double(v) => Some(v),
            FieldValue::Int(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn take_text(&mut self, name: &str) -> Option<String> {
        match self.take(name)? {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_date(&mut self, name: &str) -> Option<DateTime<Utc>> {
        match self.take(name)? {
            FieldValue::Date(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_bytes(&mut self, name: &str) -> Option<Vec<u8>> {
        match self.take(name)? {
            FieldValue::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn take_link(&mut self, name: &str) -> Option<RecordId> {
        match self.take(name)? {
            FieldValue::Link(id) => Some(id),
            _ => None,
        }
    }

    /// Construct an embedded value; `None` if absent or its constructor fails
    pub fn take_embedded<M: Mapped>(&mut self, name: &str) -> Option<M> {
        match self.take(name)? {
            FieldValue::Embedded(fields) => construct::<M>(*fields).ok(),
            _ => None,
        }
    }

    /// Construct every element of an embedded list, skipping elements that fail
    pub fn take_embedded_list<M: Mapped>(&mut self, name: &str) -> Vec<M> {
        match self.take(name) {
            Some(FieldValue::EmbeddedList(items)) => items
                .into_iter()
                .filter_map(|fields| construct::<M>(fields).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}
