//! Mapped and relatable types
//!
//! A [`Mapped`] type can be decomposed into a [`FieldSet`] through its static
//! [`Schema`] and rebuilt from one through its failable constructor. A
//! [`Relatable`] type additionally carries a nullable pointer to a parent record.

mod fields;
mod schema;

pub use fields::{FieldSet, FieldValue};
pub use schema::{
    layout_of, FieldKind, FieldSpec, Getter, Layout, LayoutFn, Schema, SchemaBuilder,
};

use crate::record::RecordId;

/// A type storable as a generic record
pub trait Mapped: Sized + Send + Sync + 'static {
    /// The type's field table
    fn schema() -> &'static Schema<Self>;

    /// Store identifier, absent until first saved
    fn record_id(&self) -> Option<RecordId>;

    /// Failable constructor from decoded fields
    fn from_fields(fields: &mut FieldSet) -> Option<Self>;

    /// Record-identity equality. Defaults to equal, present identifiers.
    fn is_same_as(&self, other: &Self) -> bool {
        match (self.record_id(), other.record_id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Record type tag
    fn record_type() -> &'static str {
        Self::schema().record_type()
    }

    fn to_fields(&self) -> FieldSet {
        Self::schema().extract(self)
    }
}

/// A mapped type that can be saved as the child of another record
pub trait Relatable: Mapped {
    /// Name of the `Link` field holding the parent pointer
    fn parent_field() -> &'static str {
        "parent"
    }

    fn parent(&self) -> Option<RecordId>;

    fn set_parent(&mut self, parent: Option<RecordId>);
}

/// Why a field set could not be turned into a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructFailure {
    /// A required field was absent, null or mistyped
    MissingRequired(&'static str),
    /// The type's constructor returned `None`
    Rejected,
}

impl ConstructFailure {
    pub fn reason(&self) -> String {
        match self {
            ConstructFailure::MissingRequired(name) => format!("missing required field {}", name),
            ConstructFailure::Rejected => "constructor rejected fields".to_string(),
        }
    }
}

/// Check required fields, then run the type's constructor
pub fn construct<M: Mapped>(mut fields: FieldSet) -> Result<M, ConstructFailure> {
    for spec in M::schema().specs() {
        if spec.required && !fields.has(spec.name) {
            return Err(ConstructFailure::MissingRequired(spec.name));
        }
    }
    M::from_fields(&mut fields).ok_or(ConstructFailure::Rejected)
}
