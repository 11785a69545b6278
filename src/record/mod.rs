//! Generic record model
//!
//! The store-agnostic document representation every mapped type is encoded
//! into. A record is a type tag, an optional store identifier and an ordered
//! list of named values.
//!
//! # Invariants
//!
//! - Field names are unique within a record (setting an existing name replaces it)
//! - Field order is insertion order
//! - References carry an identifier and a cascade policy, never referent data

mod generic;
mod value;

pub use generic::GenericRecord;
pub use value::{AssetHandle, RecordId, RecordValue, Reference, ReferenceAction};
