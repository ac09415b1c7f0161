//! In-memory implementation of DocumentStore for testing and development

use crate::config::StoreConfig;
use crate::core::error::{NotFoundError, OrderError, OrderResult, StorageError};
use crate::core::events::{ChangeFeed, DocumentChange, EventBus};
use crate::core::query::Query;
use crate::core::store::{Document, DocumentStore};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

const BACKEND: &str = "in_memory";

type Collections = HashMap<String, IndexMap<String, Value>>;

/// In-memory document store
///
/// Documents keep their insertion order inside a collection. Every write is
/// published on the store's [`EventBus`], so change feeds behave like the
/// snapshot listeners of a remote database. Clones share the same data.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
    events: EventBus,
    offline: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::default())
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_event_bus(EventBus::new(config.change_feed_capacity))
    }

    pub fn with_event_bus(events: EventBus) -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            events,
            offline: Arc::new(AtomicBool::new(false)),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`]
    /// until called again with `false`
    pub fn simulate_outage(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful writes (add/set/update/delete) so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    fn ensure_online(&self) -> OrderResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                backend: BACKEND.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn read(&self) -> OrderResult<RwLockReadGuard<'_, Collections>> {
        self.ensure_online()?;
        self.collections
            .read()
            .map_err(|e| OrderError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> OrderResult<RwLockWriteGuard<'_, Collections>> {
        self.ensure_online()?;
        self.collections
            .write()
            .map_err(|e| OrderError::Internal(format!("Failed to acquire write lock: {}", e)))
    }

    fn record_write(&self, change: DocumentChange) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.events.publish(change);
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn require_object(data: &Value) -> OrderResult<()> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StorageError::QueryError {
            backend: BACKEND.to_string(),
            message: "document data must be a JSON object".to_string(),
        }
        .into())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_all(&self, collection: &str) -> OrderResult<Vec<Document>> {
        let collections = self.read()?;

        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query(&self, collection: &str, query: &Query) -> OrderResult<Vec<Document>> {
        let all = self.get_all(collection).await?;
        Ok(query.apply(all, |doc| &doc.data))
    }

    async fn get(&self, collection: &str, id: &str) -> OrderResult<Option<Document>> {
        let collections = self.read()?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn add(&self, collection: &str, data: Value) -> OrderResult<String> {
        require_object(&data)?;
        let id = Uuid::new_v4().to_string();
        {
            let mut collections = self.write()?;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), data.clone());
        }

        self.record_write(DocumentChange::added(collection, &id, data));
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> OrderResult<()> {
        require_object(&data)?;
        let existed = {
            let mut collections = self.write()?;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), data.clone())
                .is_some()
        };

        let change = if existed {
            DocumentChange::modified(collection, id, data)
        } else {
            DocumentChange::added(collection, id, data)
        };
        self.record_write(change);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> OrderResult<()> {
        require_object(&data)?;
        let merged = {
            let mut collections = self.write()?;
            let current = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| NotFoundError::new(collection, id))?;

            if let (Some(target), Value::Object(fields)) = (current.as_object_mut(), data) {
                for (key, value) in fields {
                    target.insert(key, value);
                }
            }
            current.clone()
        };

        self.record_write(DocumentChange::modified(collection, id, merged));
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> OrderResult<()> {
        let removed = {
            let mut collections = self.write()?;
            collections
                .get_mut(collection)
                .and_then(|docs| docs.shift_remove(id))
                .is_some()
        };

        if removed {
            self.record_write(DocumentChange::removed(collection, id));
        }
        Ok(())
    }

    fn subscribe(&self, collection: &str, query: Query) -> ChangeFeed {
        self.events.subscribe(collection, query)
    }
}
