//! Change feed for real-time order lists
//!
//! Every write performed through a [`DocumentStore`](crate::core::store::DocumentStore)
//! backend is published on an [`EventBus`] as a [`DocumentChange`].
//! Listeners subscribe to a collection and receive added/modified/removed
//! deltas, the same contract as a snapshot listener on a remote document
//! database.
//!
//! # Architecture
//!
//! ```text
//! save()/delete() ──▶ store write ──▶ EventBus::publish() ──▶ broadcast ──▶ ChangeFeed (orders list)
//!                                                                      ──▶ ChangeFeed (open order)
//! ```

use crate::core::query::Query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use uuid::Uuid;

/// Kind of delta delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// A single document delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub collection: String,
    pub kind: ChangeKind,
    pub id: String,
    /// Full document after the change; `None` for removals
    pub data: Option<serde_json::Value>,
}

impl DocumentChange {
    pub fn added(collection: &str, id: &str, data: serde_json::Value) -> Self {
        Self {
            collection: collection.to_string(),
            kind: ChangeKind::Added,
            id: id.to_string(),
            data: Some(data),
        }
    }

    pub fn modified(collection: &str, id: &str, data: serde_json::Value) -> Self {
        Self {
            collection: collection.to_string(),
            kind: ChangeKind::Modified,
            id: id.to_string(),
            data: Some(data),
        }
    }

    pub fn removed(collection: &str, id: &str) -> Self {
        Self {
            collection: collection.to_string(),
            kind: ChangeKind::Removed,
            id: id.to_string(),
            data: None,
        }
    }
}

/// What a [`ChangeFeed`] yields
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A relevant delta
    Change(DocumentChange),
    /// The listener fell behind and `missed` deltas were dropped
    ///
    /// Anything built from earlier deltas may be stale and must be re-read
    /// from the store.
    Resync { missed: u64 },
}

impl FeedEvent {
    /// The delta, `None` for a resync
    pub fn into_change(self) -> Option<DocumentChange> {
        match self {
            FeedEvent::Change(change) => Some(change),
            FeedEvent::Resync { .. } => None,
        }
    }
}

/// Envelope wrapping a change with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the change was published
    pub timestamp: DateTime<Utc>,
    pub change: DocumentChange,
}

impl ChangeEnvelope {
    pub fn new(change: DocumentChange) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            change,
        }
    }
}

/// Broadcast-based event bus shared by a store and its listeners
///
/// Cheap to clone (Arc internally).
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many changes can be buffered before slow
    /// listeners start lagging.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish a change to all listeners
    ///
    /// Returns the number of receivers that will receive the change; zero
    /// when nobody is listening.
    pub fn publish(&self, change: DocumentChange) -> usize {
        tracing::debug!(collection = %change.collection, id = %change.id, kind = ?change.kind, "publishing change");
        self.sender.send(ChangeEnvelope::new(change)).unwrap_or(0)
    }

    /// Open a feed restricted to `collection` and the filters of `query`
    pub fn subscribe(&self, collection: &str, query: Query) -> ChangeFeed {
        ChangeFeed {
            collection: collection.to_string(),
            query,
            inner: BroadcastStream::new(self.sender.subscribe()),
        }
    }

    /// Get the current number of active listeners
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// Long-lived listener over one collection
///
/// Removals are always delivered; additions and modifications only when the
/// document matches the feed's filters. `order_by`/`limit` of the query are
/// applied to the initial read, not to deltas.
pub struct ChangeFeed {
    collection: String,
    query: Query,
    inner: BroadcastStream<ChangeEnvelope>,
}

impl ChangeFeed {
    /// Wait for the next relevant change
    ///
    /// Returns `None` once the store has been dropped. A listener that fell
    /// behind the bus capacity gets a single [`FeedEvent::Resync`] in place
    /// of the deltas it missed, then resumes with the oldest retained one.
    pub async fn next(&mut self) -> Option<FeedEvent> {
        while let Some(item) = self.inner.next().await {
            match item {
                Ok(envelope) => {
                    if self.is_relevant(&envelope.change) {
                        return Some(FeedEvent::Change(envelope.change));
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(missed)) => {
                    tracing::warn!(collection = %self.collection, missed, "change feed lagged, resync required");
                    return Some(FeedEvent::Resync { missed });
                }
            }
        }
        None
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn is_relevant(&self, change: &DocumentChange) -> bool {
        if change.collection != self.collection {
            return false;
        }
        match (&change.kind, &change.data) {
            (ChangeKind::Removed, _) => true,
            (_, Some(data)) => self.query.matches(data),
            (_, None) => false,
        }
    }
}
