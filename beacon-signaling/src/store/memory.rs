use crate::store::document_store::{DocumentStore, Fields, Precondition, StoreError, WatchTarget};
use crate::store::watch::{StoreEvent, Watch};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

struct Watcher {
    id: u64,
    tx: mpsc::UnboundedSender<StoreEvent>,
}

#[derive(Default)]
struct Document {
    fields: Option<Fields>,
    watchers: Vec<Watcher>,
}

#[derive(Default)]
struct Collection {
    entries: Vec<Value>,
    watchers: Vec<Watcher>,
}

struct MemoryInner {
    documents: DashMap<String, Document>,
    collections: DashMap<String, Collection>,
    next_watcher: AtomicU64,
    injected_failures: AtomicUsize,
    available: AtomicBool,
    duplicate_snapshots: AtomicBool,
}

/// In-process document store with change feeds.
///
/// Every write notifies the watchers of the touched record or collection while
/// the entry is still locked, so a feed never misses or reorders a change.
/// Failure injection knobs make transient outages reproducible.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                documents: DashMap::new(),
                collections: DashMap::new(),
                next_watcher: AtomicU64::new(1),
                injected_failures: AtomicUsize::new(0),
                available: AtomicBool::new(true),
                duplicate_snapshots: AtomicBool::new(false),
            }),
        }
    }

    /// The next `n` write operations fail with `Unavailable`.
    pub fn fail_next(&self, n: usize) {
        self.inner.injected_failures.store(n, Ordering::SeqCst);
    }

    /// While unavailable every operation fails with `Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// Deliver each record snapshot twice, like an at-least-once change feed.
    pub fn duplicate_snapshots(&self, enabled: bool) {
        self.inner
            .duplicate_snapshots
            .store(enabled, Ordering::SeqCst);
    }

    pub fn record(&self, path: &str) -> Option<Fields> {
        self.inner
            .documents
            .get(path)
            .and_then(|doc| doc.fields.clone())
    }

    pub fn entries(&self, collection: &str) -> Vec<Value> {
        self.inner
            .collections
            .get(collection)
            .map(|c| c.entries.clone())
            .unwrap_or_default()
    }

    /// Number of live watches on a record or collection path.
    pub fn watcher_count(&self, path: &str) -> usize {
        let on_record = self
            .inner
            .documents
            .get(path)
            .map(|d| d.watchers.iter().filter(|w| !w.tx.is_closed()).count())
            .unwrap_or(0);
        let on_collection = self
            .inner
            .collections
            .get(path)
            .map(|c| c.watchers.iter().filter(|w| !w.tx.is_closed()).count())
            .unwrap_or(0);
        on_record + on_collection
    }

    /// Deletes a record the way an external cleanup job would.
    pub fn remove_record(&self, path: &str) {
        let duplicate = self.inner.duplicate_snapshots.load(Ordering::SeqCst);
        if let Some(mut doc) = self.inner.documents.get_mut(path) {
            doc.fields = None;
            notify(&mut doc.watchers, StoreEvent::Snapshot(None), duplicate);
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store offline".to_owned()))
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.check_available()?;
        let injected = self.inner.injected_failures.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |n| n.checked_sub(1),
        );
        match injected {
            Ok(_) => Err(StoreError::Unavailable("injected failure".to_owned())),
            Err(_) => Ok(()),
        }
    }

    fn next_watcher_id(&self) -> u64 {
        self.inner.next_watcher.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn notify(watchers: &mut Vec<Watcher>, event: StoreEvent, duplicate: bool) {
    watchers.retain(|w| {
        if duplicate && w.tx.send(event.clone()).is_err() {
            return false;
        }
        w.tx.send(event.clone()).is_ok()
    });
}

fn unregister_record(
    inner: Weak<MemoryInner>,
    path: String,
    id: u64,
) -> impl FnOnce() + Send + Sync {
    move || {
        let Some(inner) = inner.upgrade() else { return };
        if let Some(mut doc) = inner.documents.get_mut(&path) {
            doc.watchers.retain(|w| w.id != id);
        }
    }
}

fn unregister_collection(
    inner: Weak<MemoryInner>,
    path: String,
    id: u64,
) -> impl FnOnce() + Send + Sync {
    move || {
        let Some(inner) = inner.upgrade() else { return };
        if let Some(mut collection) = inner.collections.get_mut(&path) {
            collection.watchers.retain(|w| w.id != id);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_record(&self, collection: &str) -> Result<String, StoreError> {
        self.check_write()?;

        let id = Uuid::new_v4().to_string();
        let path = format!("{}/{}", collection, id);
        let duplicate = self.inner.duplicate_snapshots.load(Ordering::SeqCst);

        let mut doc = self.inner.documents.entry(path.clone()).or_default();
        doc.fields = Some(Fields::new());
        let snapshot = StoreEvent::Snapshot(doc.fields.clone());
        notify(&mut doc.watchers, snapshot, duplicate);

        debug!("Created record {}", path);
        Ok(id)
    }

    async fn get_record(&self, path: &str) -> Result<Option<Fields>, StoreError> {
        self.check_available()?;
        Ok(self.record(path))
    }

    async fn set_fields(&self, path: &str, fields: Fields) -> Result<(), StoreError> {
        self.check_write()?;

        let duplicate = self.inner.duplicate_snapshots.load(Ordering::SeqCst);
        let mut doc = self.inner.documents.entry(path.to_owned()).or_default();
        doc.fields = Some(fields);
        let snapshot = StoreEvent::Snapshot(doc.fields.clone());
        notify(&mut doc.watchers, snapshot, duplicate);
        Ok(())
    }

    async fn update_fields(
        &self,
        path: &str,
        fields: Fields,
        precondition: Precondition,
    ) -> Result<(), StoreError> {
        self.check_write()?;

        let duplicate = self.inner.duplicate_snapshots.load(Ordering::SeqCst);
        let Some(mut doc) = self.inner.documents.get_mut(path) else {
            return Err(StoreError::NotFound(path.to_owned()));
        };
        let doc = &mut *doc;
        let Some(current) = doc.fields.as_mut() else {
            return Err(StoreError::NotFound(path.to_owned()));
        };

        if let Precondition::FieldAbsent(name) = &precondition {
            if current.contains_key(name) {
                return Err(StoreError::PreconditionFailed(path.to_owned()));
            }
        }

        current.extend(fields);
        let snapshot = StoreEvent::Snapshot(Some(current.clone()));
        notify(&mut doc.watchers, snapshot, duplicate);
        Ok(())
    }

    async fn append(&self, collection: &str, entry: Value) -> Result<String, StoreError> {
        self.check_write()?;

        let id = Uuid::new_v4().to_string();
        let mut target = self.inner.collections.entry(collection.to_owned()).or_default();
        target.entries.push(entry.clone());
        notify(&mut target.watchers, StoreEvent::Added(entry), false);
        Ok(id)
    }

    async fn subscribe(&self, target: WatchTarget) -> Result<Watch, StoreError> {
        self.check_available()?;

        let id = self.next_watcher_id();
        let (tx, rx) = mpsc::unbounded_channel();
        let weak = Arc::downgrade(&self.inner);

        let watch = match target {
            WatchTarget::Record(path) => {
                let mut doc = self.inner.documents.entry(path.clone()).or_default();
                let _ = tx.send(StoreEvent::Snapshot(doc.fields.clone()));
                doc.watchers.push(Watcher { id, tx });
                Watch::new(rx, unregister_record(weak, path, id))
            }
            WatchTarget::Additions(path) => {
                let mut collection = self.inner.collections.entry(path.clone()).or_default();
                collection.watchers.push(Watcher { id, tx });
                Watch::new(rx, unregister_collection(weak, path, id))
            }
            WatchTarget::AdditionsWithBacklog(path) => {
                let mut collection = self.inner.collections.entry(path.clone()).or_default();
                for entry in &collection.entries {
                    let _ = tx.send(StoreEvent::Added(entry.clone()));
                }
                collection.watchers.push(Watcher { id, tx });
                Watch::new(rx, unregister_collection(weak, path, id))
            }
        };

        Ok(watch)
    }
}
