//! Mapping metrics
//!
//! - Counters only, monotonic
//! - Shared through an `Arc` by every manager built from the same root
//! - Relaxed atomics; exactness across threads is not required

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for the mapping layer
#[derive(Debug, Default)]
pub struct MappingMetrics {
    records_encoded: AtomicU64,
    records_decoded: AtomicU64,
    /// Decodes that failed for any reason
    decode_failures: AtomicU64,
    /// Records skipped by list fetches because they failed to decode
    records_dropped: AtomicU64,
    /// Fields omitted at encode time
    fields_dropped: AtomicU64,
    /// References dropped at decode time
    references_dropped: AtomicU64,
    assets_staged: AtomicU64,
    store_calls: AtomicU64,
    store_failures: AtomicU64,
    timeouts: AtomicU64,
}

impl MappingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_records_encoded(&self) {
        self.records_encoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_decoded(&self) {
        self.records_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_failures(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_records_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fields_dropped(&self) {
        self.fields_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_references_dropped(&self) {
        self.references_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_assets_staged(&self) {
        self.assets_staged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_calls(&self) {
        self.store_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_encoded: self.records_encoded.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
            fields_dropped: self.fields_dropped.load(Ordering::Relaxed),
            references_dropped: self.references_dropped.load(Ordering::Relaxed),
            assets_staged: self.assets_staged.load(Ordering::Relaxed),
            store_calls: self.store_calls.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`MappingMetrics`]
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub records_encoded: u64,
    pub records_decoded: u64,
    pub decode_failures: u64,
    pub records_dropped: u64,
    pub fields_dropped: u64,
    pub references_dropped: u64,
    pub assets_staged: u64,
    pub store_calls: u64,
    pub store_failures: u64,
    pub timeouts: u64,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
