//! In-memory record store
//!
//! Implements the full store contract in process: identifier assignment,
//! predicate queries, idempotent deletes and cascade of
//! `CascadeDeleteReferent` references.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use super::errors::{StoreError, StoreResult};
use super::predicate::Predicate;
use super::{AccountStatus, RecordStore, StoreFuture};
use crate::record::{GenericRecord, RecordId};

/// In-memory store for tests and local use
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<RecordId, GenericRecord>>>,
    /// Insertion order of identifiers, so queries return a stable order
    order: Arc<RwLock<Vec<RecordId>>>,
    status: AccountStatus,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_status(AccountStatus::Available)
    }

    /// Create a store reporting the given account status
    pub fn with_status(status: AccountStatus) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            order: Arc::new(RwLock::new(Vec::new())),
            status,
        }
    }

    /// Store a record exactly as given, bypassing the mapping layer.
    /// Assigns an identifier if the record has none.
    pub fn insert_raw(&self, record: GenericRecord) -> StoreResult<RecordId> {
        Ok(self.put(record)?.id().cloned().unwrap_or_else(RecordId::generate))
    }

    /// Snapshot of a stored record
    pub fn get_raw(&self, id: &RecordId) -> Option<GenericRecord> {
        self.records.read().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn put(&self, mut record: GenericRecord) -> StoreResult<GenericRecord> {
        if record.record_type().is_empty() {
            return Err(StoreError::Validation("record type is empty".to_string()));
        }
        let id = match record.id() {
            Some(id) => id.clone(),
            None => {
                let id = RecordId::generate();
                record.set_id(id.clone());
                id
            }
        };
        record.set_modified_at(Utc::now());

        let mut records = self.records.write().map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut order = self.order.write().map_err(|e| StoreError::Internal(e.to_string()))?;
        if records.insert(id.clone(), record.clone()).is_none() {
            order.push(id);
        }
        Ok(record)
    }

    fn remove_cascading(&self, id: &RecordId) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|e| StoreError::Internal(e.to_string()))?;
        let mut order = self.order.write().map_err(|e| StoreError::Internal(e.to_string()))?;

        let mut pending = vec![id.clone()];
        while let Some(next) = pending.pop() {
            let Some(removed) = records.remove(&next) else {
                continue;
            };
            order.retain(|existing| existing != &next);
            pending.extend(
                removed
                    .references()
                    .into_iter()
                    .filter(|r| r.cascades())
                    .map(|r| r.id.clone()),
            );
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryStore {
    fn save(&self, record: GenericRecord) -> StoreFuture<'_, GenericRecord> {
        Box::pin(async move { self.put(record) })
    }

    fn fetch<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<GenericRecord>> {
        Box::pin(async move {
            let records = self.records.read().map_err(|e| StoreError::Internal(e.to_string()))?;
            Ok(records.get(id).cloned())
        })
    }

    fn query<'a>(
        &'a self,
        record_type: &'a str,
        predicate: &'a Predicate,
    ) -> StoreFuture<'a, Vec<GenericRecord>> {
        Box::pin(async move {
            let records = self.records.read().map_err(|e| StoreError::Internal(e.to_string()))?;
            let order = self.order.read().map_err(|e| StoreError::Internal(e.to_string()))?;
            Ok(order
                .iter()
                .filter_map(|id| records.get(id))
                .filter(|r| r.record_type() == record_type && predicate.matches(r))
                .cloned()
                .collect())
        })
    }

    fn delete<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.remove_cascading(id) })
    }

    fn account_status(&self) -> StoreFuture<'_, AccountStatus> {
        let status = self.status;
        Box::pin(async move { Ok(status) })
    }
}
