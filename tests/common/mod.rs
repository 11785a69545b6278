//! Shared fixtures for recordkit integration tests
//!
//! - Mapped model types: `Task` (scalars, blob, embedded notes), `Note`,
//!   `SubTask` (relatable), `Contact` (custom identity)
//! - Three-level embedding: `Shelf` holds `Bin`s, each `Bin` holds `Item`s
//! - `FaultyStore`: a `RecordStore` wrapper that counts calls, tracks peak
//!   concurrency, and injects failures or delays

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use recordkit::store::StoreFuture;
use recordkit::{
    AccountStatus, FieldSet, FieldValue, GenericRecord, ManagerConfig, Mapped, MemoryStore,
    Predicate, RecordId, RecordManager, RecordStore, RecordValue, Relatable, Schema, StoreError,
};

// =============================================================================
// Model types
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: Option<RecordId>,
    pub body: String,
}

impl Note {
    pub fn new(body: &str) -> Self {
        Self {
            id: None,
            body: body.to_string(),
        }
    }
}

impl Mapped for Note {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Note>> = LazyLock::new(|| {
            Schema::<Note>::builder("Note")
                .text("body", |n| n.body.clone().into())
                .required()
                .build()
        });
        &SCHEMA
    }

    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn from_fields(fields: &mut FieldSet) -> Option<Self> {
        Some(Note {
            id: fields.record_id().cloned(),
            body: fields.take_text("body")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Option<RecordId>,
    pub title: String,
    pub done: bool,
    pub priority: i64,
    pub due: Option<DateTime<Utc>>,
    pub cover: Option<Vec<u8>>,
    pub notes: Vec<Note>,
}

impl Task {
    pub fn new(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            done: false,
            priority: 0,
            due: None,
            cover: None,
            notes: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }
}

impl Mapped for Task {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Task>> = LazyLock::new(|| {
            Schema::<Task>::builder("Task")
                .text("title", |t| t.title.clone().into())
                .required()
                .bool("done", |t| t.done.into())
                .int("priority", |t| t.priority.into())
                .date("due", |t| FieldValue::optional(t.due))
                .bytes("cover", |t| FieldValue::optional(t.cover.clone()))
                .embedded_list::<Note>("notes", |t| FieldValue::embed_all(&t.notes))
                .build()
        });
        &SCHEMA
    }

    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn from_fields(fields: &mut FieldSet) -> Option<Self> {
        Some(Task {
            id: fields.record_id().cloned(),
            title: fields.take_text("title")?,
            done: fields.take_bool("done").unwrap_or(false),
            priority: fields.take_int("priority").unwrap_or(0),
            due: fields.take_date("due"),
            cover: fields.take_bytes("cover"),
            notes: fields.take_embedded_list("notes"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubTask {
    pub id: Option<RecordId>,
    pub title: String,
    pub parent: Option<RecordId>,
}

impl SubTask {
    pub fn new(title: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            parent: None,
        }
    }
}

impl Mapped for SubTask {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<SubTask>> = LazyLock::new(|| {
            Schema::<SubTask>::builder("SubTask")
                .text("title", |s| s.title.clone().into())
                .required()
                .link("parent", |s| FieldValue::link(s.parent.clone()))
                .build()
        });
        &SCHEMA
    }

    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn from_fields(fields: &mut FieldSet) -> Option<Self> {
        Some(SubTask {
            id: fields.record_id().cloned(),
            title: fields.take_text("title")?,
            parent: fields.take_link("parent"),
        })
    }
}

impl Relatable for SubTask {
    fn parent(&self) -> Option<RecordId> {
        self.parent.clone()
    }

    fn set_parent(&mut self, parent: Option<RecordId>) {
        self.parent = parent;
    }
}

/// Identified by email address rather than record identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: Option<RecordId>,
    pub email: String,
    pub name: String,
}

impl Contact {
    pub fn new(email: &str, name: &str) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            name: name.to_string(),
        }
    }
}

impl Mapped for Contact {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Contact>> = LazyLock::new(|| {
            Schema::<Contact>::builder("Contact")
                .text("email", |c| c.email.clone().into())
                .required()
                .text("name", |c| c.name.clone().into())
                .build()
        });
        &SCHEMA
    }

    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn from_fields(fields: &mut FieldSet) -> Option<Self> {
        Some(Contact {
            id: fields.record_id().cloned(),
            email: fields.take_text("email")?,
            name: fields.take_text("name").unwrap_or_default(),
        })
    }

    fn is_same_as(&self, other: &Self) -> bool {
        self.email.eq_ignore_ascii_case(&other.email)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Option<RecordId>,
    pub name: String,
}

impl Mapped for Item {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Item>> = LazyLock::new(|| {
            Schema::<Item>::builder("Item")
                .text("name", |i| i.name.clone().into())
                .required()
                .build()
        });
        &SCHEMA
    }

    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn from_fields(fields: &mut FieldSet) -> Option<Self> {
        Some(Item {
            id: fields.record_id().cloned(),
            name: fields.take_text("name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub id: Option<RecordId>,
    pub label: String,
    pub items: Vec<Item>,
}

impl Mapped for Bin {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Bin>> = LazyLock::new(|| {
            Schema::<Bin>::builder("Bin")
                .text("label", |b| b.label.clone().into())
                .required()
                .embedded_list::<Item>("items", |b| FieldValue::embed_all(&b.items))
                .build()
        });
        &SCHEMA
    }

    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn from_fields(fields: &mut FieldSet) -> Option<Self> {
        Some(Bin {
            id: fields.record_id().cloned(),
            label: fields.take_text("label")?,
            items: fields.take_embedded_list("items"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
    pub id: Option<RecordId>,
    pub label: String,
    pub bins: Vec<Bin>,
}

impl Shelf {
    /// A shelf of bins, each holding the named items
    pub fn stocked(label: &str, bins: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            id: None,
            label: label.to_string(),
            bins: bins
                .into_iter()
                .map(|(bin, items)| Bin {
                    id: None,
                    label: bin.to_string(),
                    items: items
                        .into_iter()
                        .map(|name| Item {
                            id: None,
                            name: name.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl Mapped for Shelf {
    fn schema() -> &'static Schema<Self> {
        static SCHEMA: LazyLock<Schema<Shelf>> = LazyLock::new(|| {
            Schema::<Shelf>::builder("Shelf")
                .text("label", |s| s.label.clone().into())
                .required()
                .embedded_list::<Bin>("bins", |s| FieldValue::embed_all(&s.bins))
                .build()
        });
        &SCHEMA
    }

    fn record_id(&self) -> Option<RecordId> {
        self.id.clone()
    }

    fn from_fields(fields: &mut FieldSet) -> Option<Self> {
        Some(Shelf {
            id: fields.record_id().cloned(),
            label: fields.take_text("label")?,
            bins: fields.take_embedded_list("bins"),
        })
    }
}

// =============================================================================
// Fault injection
// =============================================================================

/// `RecordStore` wrapper that counts calls and injects failures
pub struct FaultyStore {
    pub inner: MemoryStore,
    failing_titles: Vec<String>,
    status_error: Option<StoreError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Marks one data call as in flight until dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FaultyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing_titles: Vec::new(),
            status_error: None,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Reject saves of records whose `title` is one of `titles`
    pub fn failing_saves_for(mut self, titles: &[&str]) -> Self {
        self.failing_titles = titles.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn failing_status(mut self, error: StoreError) -> Self {
        self.status_error = Some(error);
        self
    }

    /// Delay every data call by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// A store whose data calls never finish within a test's lifetime
    pub fn hanging(inner: MemoryStore) -> Self {
        Self::new(inner).with_delay(Duration::from_secs(3600))
    }

    /// Data calls issued so far (account status excluded)
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most data calls ever in flight at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        guard
    }

    fn rejects(&self, record: &GenericRecord) -> bool {
        matches!(
            record.get("title"),
            Some(RecordValue::Text(title)) if self.failing_titles.contains(title)
        )
    }
}

impl RecordStore for FaultyStore {
    fn save(&self, record: GenericRecord) -> StoreFuture<'_, GenericRecord> {
        Box::pin(async move {
            let _call = self.enter().await;
            if self.rejects(&record) {
                return Err(StoreError::Validation("title rejected".into()));
            }
            self.inner.save(record).await
        })
    }

    fn fetch<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, Option<GenericRecord>> {
        Box::pin(async move {
            let _call = self.enter().await;
            self.inner.fetch(id).await
        })
    }

    fn query<'a>(
        &'a self,
        record_type: &'a str,
        predicate: &'a Predicate,
    ) -> StoreFuture<'a, Vec<GenericRecord>> {
        Box::pin(async move {
            let _call = self.enter().await;
            self.inner.query(record_type, predicate).await
        })
    }

    fn delete<'a>(&'a self, id: &'a RecordId) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let _call = self.enter().await;
            self.inner.delete(id).await
        })
    }

    fn account_status(&self) -> StoreFuture<'_, AccountStatus> {
        Box::pin(async move {
            match &self.status_error {
                Some(e) => Err(e.clone()),
                None => self.inner.account_status().await,
            }
        })
    }
}

// =============================================================================
// Setup helpers
// =============================================================================

/// Config staging assets under `temp`
pub fn config_in(temp: &TempDir) -> ManagerConfig {
    ManagerConfig::default().with_asset_dir(temp.path().join("assets"))
}

pub fn task_manager(store: Arc<dyn RecordStore>, temp: &TempDir) -> RecordManager<Task> {
    RecordManager::new(store, config_in(temp))
}

/// Sorted copy, for comparing results whose order is unspecified
pub fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}
