//! Reference resolution
//!
//! Encode side: embedded values become child records plus cascading
//! references. Decode side: references are fetched from the store and decoded
//! back into field sets.
//!
//! Reference lists fan out with at most `max_concurrent_fetches` fetches in
//! flight and join every branch before returning, preserving list order. The
//! fetches are plain futures owned by the caller, so dropping the enclosing
//! operation cancels them. Referents that are missing or fail to load are
//! dropped from the result.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};

use crate::codec::{EncodedRecord, RecordCodec};
use crate::mapping::{FieldSet, FieldSpec, Layout};
use crate::observability::{Event, Logger, MappingMetrics};
use crate::record::{RecordId, Reference};
use crate::store::RecordStore;

/// Converts embedded values to references and back
#[derive(Clone)]
pub struct ReferenceResolver {
    store: Arc<dyn RecordStore>,
    metrics: Arc<MappingMetrics>,
    max_concurrent_fetches: usize,
}

impl ReferenceResolver {
    pub fn new(
        store: Arc<dyn RecordStore>,
        metrics: Arc<MappingMetrics>,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            store,
            metrics,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
        }
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_concurrent_fetches
    }

    /// Encode an embedded value as a child record owned by its parent
    ///
    /// A value without an identifier gets a fresh one so the parent can point
    /// at it before either record is saved.
    pub fn to_reference(
        &self,
        codec: &RecordCodec,
        mut item: FieldSet,
        layout: &[FieldSpec],
    ) -> (EncodedRecord, Reference) {
        let id = match item.record_id() {
            Some(id) => id.clone(),
            None => {
                let id = RecordId::generate();
                item.set_record_id(id.clone());
                id
            }
        };
        (codec.encode_fields(item, layout), Reference::owned(id))
    }

    /// Fetch and decode one referent
    ///
    /// `None` if it is missing, unreadable, or a record of another type than
    /// the layout declares.
    pub async fn resolve_reference(
        &self,
        codec: &RecordCodec,
        reference: &Reference,
        layout: Layout,
    ) -> Option<FieldSet> {
        self.metrics.increment_store_calls();
        match self.store.fetch(&reference.id).await {
            Ok(Some(record)) if record.record_type() != layout.record_type => {
                let reason = format!(
                    "referent is {}, expected {}",
                    record.record_type(),
                    layout.record_type
                );
                self.dropped(&reference.id, &reason);
                None
            }
            Ok(Some(record)) => Some(codec.decode_fields(record, layout.specs).await),
            Ok(None) => {
                self.dropped(&reference.id, "referent not found");
                None
            }
            Err(e) => {
                self.metrics.increment_store_failures();
                self.dropped(&reference.id, &e.to_string());
                None
            }
        }
    }

    /// Fetch and decode a list of referents, in list order, skipping failures
    pub async fn resolve_references(
        &self,
        codec: &RecordCodec,
        references: &[Reference],
        layout: Layout,
    ) -> Vec<FieldSet> {
        let fetches: Vec<_> = references
            .iter()
            .map(|reference| self.resolve_reference(codec, reference, layout))
            .collect();

        stream::iter(fetches)
            .buffered(self.max_concurrent_fetches)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    fn dropped(&self, id: &RecordId, reason: &str) {
        self.metrics.increment_references_dropped();
        Logger::warn(
            Event::ReferenceDropped,
            &[("id", id.as_str()), ("reason", reason)],
        );
    }
}
