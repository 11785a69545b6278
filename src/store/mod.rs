//! Record store contract
//!
//! The mapping layer talks to its backing document store only through
//! [`RecordStore`]: save, fetch, query, delete, and an advisory account status.
//! Transport, authentication and account management belong to the
//! implementation. [`MemoryStore`] is the in-process implementation.
//!
//! Methods return boxed futures so managers can hold an `Arc<dyn RecordStore>`
//! handed to them at construction.

mod errors;
mod memory;
mod predicate;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use predicate::{Comparison, Predicate};

use std::future::Future;
use std::pin::Pin;

use crate::record::{GenericRecord, RecordId};

/// Boxed future returned by [`RecordStore`] methods
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Account status reported by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Available,
    NoAccount,
    Restricted,
    Indeterminate,
    TemporarilyUnavailable,
}

impl AccountStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, AccountStatus::Available)
    }
}

/// A keyed document store
pub trait RecordStore: Send + Sync {
    /// Upsert by identifier if present, otherwise assign a new one.
    /// Returns the persisted record, store-assigned fields included.
    fn save(&self, record: GenericRecord) -> StoreFuture<'_, GenericRecord>;

    /// Fetch by identifier; `None` if absent
    fn fetch<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<GenericRecord>>;

    /// All records of `record_type` matching `predicate`
    fn query<'a>(
        &'a self,
        record_type: &'a str,
        predicate: &'a Predicate,
    ) -> StoreFuture<'a, Vec<GenericRecord>>;

    /// Delete by identifier. Deleting an absent id succeeds.
    fn delete<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, ()>;

    /// Advisory account status
    fn account_status(&self) -> StoreFuture<'_, AccountStatus>;
}
