//! recordkit - typed object mapping over a keyed document store
//!
//! Maps application types to generic records (scalar fields, staged blobs,
//! references to other records) and layers CRUD plus a parent/child
//! relationship protocol on top of any [`store::RecordStore`].

pub mod codec;
pub mod manager;
pub mod mapping;
pub mod observability;
pub mod record;
pub mod resolver;
pub mod store;

pub use codec::{AssetCodec, AssetError, EncodedRecord, RecordCodec};
pub use manager::{ManagerConfig, ManagerError, ManagerResult, RecordManager};
pub use mapping::{FieldKind, FieldSet, FieldSpec, FieldValue, Mapped, Relatable, Schema};
pub use record::{AssetHandle, GenericRecord, RecordId, RecordValue, Reference, ReferenceAction};
pub use resolver::ReferenceResolver;
pub use store::{AccountStatus, MemoryStore, Predicate, RecordStore, StoreError, StoreResult};
