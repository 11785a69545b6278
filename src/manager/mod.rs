//! Record manager
//!
//! [`RecordManager<T>`] is the typed entry point: CRUD for one mapped type plus
//! the parent/child protocol in `relations`. Every manager takes its store
//! handle at construction; managers for related types are derived with
//! [`RecordManager::scoped`] and share the store, codec, metrics and account
//! status of their root.
//!
//! Operations issue one store round-trip per logical step and never retry.
//! With `operation_timeout_ms` configured, a whole operation (reference
//! resolution included) is abandoned once the limit passes.

mod config;
mod errors;
mod relations;

pub use config::ManagerConfig;
pub use errors::{ManagerError, ManagerResult};

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::sync::OnceCell;

use crate::codec::{AssetCodec, EncodedRecord, RecordCodec};
use crate::mapping::Mapped;
use crate::observability::{Event, Logger, MappingMetrics};
use crate::record::{GenericRecord, RecordId};
use crate::resolver::ReferenceResolver;
use crate::store::{AccountStatus, Predicate, RecordStore, StoreFuture};

/// Typed CRUD over a record store
pub struct RecordManager<T> {
    store: Arc<dyn RecordStore>,
    codec: RecordCodec,
    config: ManagerConfig,
    metrics: Arc<MappingMetrics>,
    /// Written once, by the construction-time check or the first caller
    status: Arc<OnceCell<AccountStatus>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordManager<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
            config: self.config.clone(),
            metrics: Arc::clone(&self.metrics),
            status: Arc::clone(&self.status),
            _marker: PhantomData,
        }
    }
}

impl<T: Mapped> RecordManager<T> {
    /// Create a manager over `store`
    ///
    /// When called inside a Tokio runtime, the account status check starts in
    /// the background immediately; otherwise it runs on the first
    /// [`account_status`](Self::account_status) call.
    pub fn new(store: Arc<dyn RecordStore>, config: ManagerConfig) -> Self {
        let metrics = Arc::new(MappingMetrics::new());
        let assets = config
            .asset_dir
            .clone()
            .map(AssetCodec::new)
            .unwrap_or_default();
        let resolver = ReferenceResolver::new(
            Arc::clone(&store),
            Arc::clone(&metrics),
            config.fetch_limit(),
        );
        let codec = RecordCodec::new(assets, resolver, Arc::clone(&metrics));
        let status = Arc::new(OnceCell::new());

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let store = Arc::clone(&store);
            let status = Arc::clone(&status);
            handle.spawn(async move {
                status.get_or_init(|| check_account(store.as_ref())).await;
            });
        }

        Self {
            store,
            codec,
            config,
            metrics,
            status,
            _marker: PhantomData,
        }
    }

    /// Manager for another mapped type sharing this manager's store and state
    pub fn scoped<C: Mapped>(&self) -> RecordManager<C> {
        RecordManager {
            store: Arc::clone(&self.store),
            codec: self.codec.clone(),
            config: self.config.clone(),
            metrics: Arc::clone(&self.metrics),
            status: Arc::clone(&self.status),
            _marker: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MappingMetrics> {
        &self.metrics
    }

    /// Cached availability; `false` until the status check has finished.
    /// Advisory only, no operation is gated on it.
    pub fn is_available(&self) -> bool {
        self.status.get().is_some_and(AccountStatus::is_available)
    }

    /// Account status, checking the store if no check has completed yet
    pub async fn account_status(&self) -> AccountStatus {
        *self
            .status
            .get_or_init(|| check_account(self.store.as_ref()))
            .await
    }

    /// Save `item` and return it as the store persisted it
    pub async fn save(&self, item: &T) -> ManagerResult<T> {
        self.bounded("save", self.save_item(item)).await
    }

    /// Fetch one record by identifier
    ///
    /// `None` if no record exists under `id` or it belongs to another type.
    pub async fn fetch(&self, id: &RecordId) -> ManagerResult<Option<T>> {
        self.bounded("fetch", async {
            let Some(record) = self.call("fetch", self.store.fetch(id)).await? else {
                return Ok(None);
            };
            if record.record_type() != T::record_type() {
                return Ok(None);
            }
            self.decode_saved(record).await.map(Some)
        })
        .await
    }

    /// Every record of `T`
    pub async fn fetch_all(&self) -> ManagerResult<Vec<T>> {
        self.fetch_where(&Predicate::All).await
    }

    /// Records of `T` matching `predicate`, in store order
    ///
    /// Records that fail to decode are dropped from the result and counted in
    /// `records_dropped`; they never fail the call.
    pub async fn fetch_where(&self, predicate: &Predicate) -> ManagerResult<Vec<T>> {
        self.bounded("fetch_all", async {
            let records = self
                .call("query", self.store.query(T::record_type(), predicate))
                .await?;
            let ids: Vec<String> = records
                .iter()
                .map(|r| r.id().map(|id| id.to_string()).unwrap_or_default())
                .collect();

            let decoded: Vec<Option<T>> = stream::iter(records.into_iter().map(|r| self.codec.decode::<T>(r)))
                .buffered(self.config.fetch_limit())
                .collect()
                .await;

            let mut items = Vec::with_capacity(decoded.len());
            for (id, item) in ids.iter().zip(decoded) {
                match item {
                    Some(item) => items.push(item),
                    None => {
                        self.metrics.increment_records_dropped();
                        Logger::warn(
                            Event::RecordDropped,
                            &[("record_type", T::record_type()), ("id", id.as_str())],
                        );
                    }
                }
            }
            Ok(items)
        })
        .await
    }

    /// Save an item that has already been persisted
    ///
    /// The store upserts by identifier; stored fields are replaced wholesale.
    pub async fn update(&self, item: &T) -> ManagerResult<T> {
        if item.record_id().is_none() {
            return Err(ManagerError::missing_identifier(T::record_type()));
        }
        self.bounded("update", self.save_item(item)).await
    }

    /// Delete `item` by identifier. No store call is made without one.
    pub async fn delete(&self, item: &T) -> ManagerResult<()> {
        let id = item
            .record_id()
            .ok_or_else(|| ManagerError::missing_identifier(T::record_type()))?;
        self.bounded("delete", self.delete_id(&id)).await
    }

    /// Delete every stored record that [`Mapped::is_same_as`] `item`
    ///
    /// Works for items whose identifier was lost, at the cost of fetching every
    /// record of the type. Fails with `NotFound` if nothing matches.
    pub async fn delete_matching(&self, item: &T) -> ManagerResult<usize> {
        self.bounded("delete_matching", async {
            let candidates = self
                .call("query", self.store.query(T::record_type(), &Predicate::All))
                .await?;

            let mut deleted = 0;
            for record in candidates {
                let Some(id) = record.id().cloned() else {
                    continue;
                };
                let Some(candidate) = self.codec.decode::<T>(record).await else {
                    continue;
                };
                if candidate.is_same_as(item) {
                    self.delete_id(&id).await?;
                    deleted += 1;
                }
            }

            if deleted == 0 {
                return Err(ManagerError::NotFound {
                    record_type: T::record_type().to_string(),
                });
            }
            Ok(deleted)
        })
        .await
    }

    async fn delete_id(&self, id: &RecordId) -> ManagerResult<()> {
        self.call("delete", self.store.delete(id)).await?;
        Logger::info(
            Event::RecordDeleted,
            &[("record_type", T::record_type()), ("id", id.as_str())],
        );
        Ok(())
    }

    /// Encode, persist embedded records then the record itself, decode the result
    pub(crate) async fn save_item(&self, item: &T) -> ManagerResult<T> {
        let encoded = self.codec.encode(item);
        let saved = self.persist(encoded).await?;
        self.decode_saved(saved).await
    }

    async fn persist(&self, encoded: EncodedRecord) -> ManagerResult<GenericRecord> {
        for child in encoded.children {
            self.call("save", self.store.save(child)).await?;
        }
        self.call("save", self.store.save(encoded.record)).await
    }

    async fn decode_saved(&self, record: GenericRecord) -> ManagerResult<T> {
        let id = record.id().map(|id| id.to_string()).unwrap_or_default();
        self.codec
            .decode::<T>(record)
            .await
            .ok_or_else(|| ManagerError::Decode {
                record_type: T::record_type().to_string(),
                id,
            })
    }

    /// One store round-trip, counted and logged on failure
    async fn call<R>(&self, operation: &'static str, request: StoreFuture<'_, R>) -> ManagerResult<R> {
        self.metrics.increment_store_calls();
        request.await.map_err(|e| {
            self.metrics.increment_store_failures();
            Logger::error(
                Event::StoreCallFailed,
                &[
                    ("operation", operation),
                    ("record_type", T::record_type()),
                    ("code", e.code()),
                    ("reason", e.to_string().as_str()),
                ],
            );
            ManagerError::Store(e)
        })
    }

    /// Apply the configured operation timeout
    async fn bounded<R>(
        &self,
        operation: &'static str,
        work: impl Future<Output = ManagerResult<R>>,
    ) -> ManagerResult<R> {
        let Some(limit) = self.config.operation_timeout() else {
            return work.await;
        };
        match tokio::time::timeout(limit, work).await {
            Ok(result) => result,
            Err(_) => {
                let after_ms = limit.as_millis() as u64;
                self.metrics.increment_timeouts();
                Logger::error(
                    Event::OperationTimedOut,
                    &[
                        ("operation", operation),
                        ("record_type", T::record_type()),
                        ("after_ms", after_ms.to_string().as_str()),
                    ],
                );
                Err(ManagerError::Timeout { operation, after_ms })
            }
        }
    }
}

async fn check_account(store: &dyn RecordStore) -> AccountStatus {
    match store.account_status().await {
        Ok(status) => {
            match status {
                AccountStatus::Available => Logger::info(Event::AccountAvailable, &[]),
                AccountStatus::NoAccount => Logger::warn(Event::AccountMissing, &[]),
                AccountStatus::Restricted => Logger::warn(Event::AccountRestricted, &[]),
                AccountStatus::Indeterminate => Logger::warn(Event::AccountIndeterminate, &[]),
                AccountStatus::TemporarilyUnavailable => {
                    Logger::warn(Event::AccountTemporarilyUnavailable, &[])
                }
            }
            status
        }
        Err(e) => {
            Logger::error(
                Event::AccountStatusFailed,
                &[("code", e.code()), ("reason", e.to_string().as_str())],
            );
            AccountStatus::Indeterminate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{FieldSet, Schema};
    use crate::store::MemoryStore;
    use std::sync::LazyLock;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    struct Memo {
        id: Option<RecordId>,
        text: String,
    }

    impl Memo {
        fn new(text: &str) -> Self {
            Self { id: None, text: text.to_string() }
        }
    }

    impl Mapped for Memo {
        fn schema() -> &'static Schema<Self> {
            static SCHEMA: LazyLock<Schema<Memo>> = LazyLock::new(|| {
                Schema::<Memo>::builder("Memo")
                    .text("text", |m| m.text.clone().into())
                    .required()
                    .build()
            });
            &SCHEMA
        }

        fn record_id(&self) -> Option<RecordId> {
            self.id.clone()
        }

        fn from_fields(fields: &mut FieldSet) -> Option<Self> {
            Some(Memo {
                id: fields.record_id().cloned(),
                text: fields.take_text("text")?,
            })
        }
    }

    fn manager(store: MemoryStore, temp: &TempDir) -> RecordManager<Memo> {
        RecordManager::new(Arc::new(store), ManagerConfig::default().with_asset_dir(temp.path()))
    }

    #[tokio::test]
    async fn test_save_then_fetch() {
        let temp = TempDir::new().unwrap();
        let manager = manager(MemoryStore::new(), &temp);

        let saved = manager.save(&Memo::new("hello")).await.unwrap();
        let id = saved.id.clone().unwrap();

        let fetched = manager.fetch(&id).await.unwrap().unwrap();
        assert_eq!(fetched, saved);
        assert!(manager.fetch(&RecordId::new("absent")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_ignores_other_record_types() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let mut other = GenericRecord::with_id("Other", RecordId::new("x"));
        other.set("text", crate::record::RecordValue::from("not a memo"));
        store.insert_raw(other).unwrap();

        let manager = manager(store, &temp);
        assert!(manager.fetch(&RecordId::new("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_requires_identifier() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let manager = manager(store.clone(), &temp);

        let err = manager.update(&Memo::new("draft")).await.unwrap_err();
        assert!(matches!(err, ManagerError::MissingIdentifier { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_account_status_is_cached() {
        let temp = TempDir::new().unwrap();
        let manager = manager(MemoryStore::with_status(AccountStatus::NoAccount), &temp);

        assert_eq!(manager.account_status().await, AccountStatus::NoAccount);
        assert!(!manager.is_available());

        let scoped: RecordManager<Memo> = manager.scoped();
        assert_eq!(scoped.account_status().await, AccountStatus::NoAccount);
    }

    #[tokio::test]
    async fn test_available_after_check() {
        let temp = TempDir::new().unwrap();
        let manager = manager(MemoryStore::new(), &temp);
        assert_eq!(manager.account_status().await, AccountStatus::Available);
        assert!(manager.is_available());
    }

    #[test]
    fn test_construct_outside_runtime_defers_status() {
        let temp = TempDir::new().unwrap();
        let manager = manager(MemoryStore::new(), &temp);
        assert!(!manager.is_available());
    }

    #[tokio::test]
    async fn test_delete_matching_reports_not_found() {
        let temp = TempDir::new().unwrap();
        let manager = manager(MemoryStore::new(), &temp);
        manager.save(&Memo::new("keep")).await.unwrap();

        let err = manager.delete_matching(&Memo::new("ghost")).await.unwrap_err();
        assert!(matches!(err, ManagerError::NotFound { .. }));
        assert_eq!(manager.fetch_all().await.unwrap().len(), 1);
    }
}
