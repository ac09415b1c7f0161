//! Order list kept current by the store's change feed
//!
//! The list owns its records; it never touches an open
//! [`OrderFormState`](crate::form::OrderFormState). When the order shown in
//! the form changes remotely, the list reports it and the caller decides
//! whether to refresh or leave the page.
//!
//! The list holds at most `limit` orders, the newest by `createdAt`. When
//! its feed lags behind the store it re-reads the collection instead of
//! trusting the deltas it still has.

use crate::core::error::OrderResult;
use crate::core::events::{ChangeFeed, ChangeKind, DocumentChange, FeedEvent};
use crate::core::query::{Query, SortDirection};
use crate::core::store::{Document, DocumentStore};
use crate::entities::OrderRecord;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::Arc;

/// Remote change to the order currently open in the form
#[derive(Debug, Clone, PartialEq)]
pub enum OpenOrderChange {
    /// Someone else saved the order; the fresh record is attached
    Modified(Box<OrderRecord>),
    /// The order no longer exists
    Deleted(String),
}

/// Result of one step of the live list
#[derive(Debug, Clone, PartialEq)]
pub enum ListUpdate {
    /// One delta merged into the list
    Delta {
        id: String,
        kind: ChangeKind,
        open_order: Option<OpenOrderChange>,
    },
    /// The feed lagged by `missed` deltas and the list was read again
    Reloaded {
        missed: u64,
        open_order: Option<OpenOrderChange>,
    },
}

impl ListUpdate {
    /// Effect on the order open in the form, if any
    pub fn open_order(&self) -> Option<&OpenOrderChange> {
        match self {
            ListUpdate::Delta { open_order, .. } | ListUpdate::Reloaded { open_order, .. } => {
                open_order.as_ref()
            }
        }
    }

    pub fn into_open_order(self) -> Option<OpenOrderChange> {
        match self {
            ListUpdate::Delta { open_order, .. } | ListUpdate::Reloaded { open_order, .. } => {
                open_order
            }
        }
    }

    /// Kind of the merged delta; `None` after a reload
    pub fn kind(&self) -> Option<ChangeKind> {
        match self {
            ListUpdate::Delta { kind, .. } => Some(*kind),
            ListUpdate::Reloaded { .. } => None,
        }
    }
}

/// Loaded orders plus the feed that keeps them fresh
pub struct LiveOrderList {
    store: Arc<dyn DocumentStore>,
    collection: String,
    limit: usize,
    orders: IndexMap<String, OrderRecord>,
    open_order: Option<String>,
    feed: ChangeFeed,
}

fn parse_record(document: &Document) -> Option<OrderRecord> {
    match OrderRecord::from_document(document) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(order_id = %document.id, error = %err, "skipping malformed order");
            None
        }
    }
}

/// Newest `limit` orders, newest first
async fn read_newest(
    store: &dyn DocumentStore,
    collection: &str,
    limit: usize,
) -> OrderResult<IndexMap<String, OrderRecord>> {
    let query = Query::new()
        .order_by("createdAt", SortDirection::Desc)
        .limit(limit);
    let documents = store.query(collection, &query).await?;
    Ok(documents
        .iter()
        .filter_map(parse_record)
        .map(|r| (r.id.clone(), r))
        .collect())
}

impl LiveOrderList {
    /// Subscribe, then load the newest `limit` orders
    ///
    /// The feed is opened before the initial read so no write in between is
    /// missed; replaying it is harmless since deltas carry full documents.
    pub async fn load(
        store: Arc<dyn DocumentStore>,
        collection: &str,
        limit: usize,
    ) -> OrderResult<Self> {
        let feed = store.subscribe(collection, Query::new());
        let orders = read_newest(store.as_ref(), collection, limit).await?;
        tracing::debug!(collection, count = orders.len(), "order list loaded");
        Ok(Self {
            store,
            collection: collection.to_string(),
            limit,
            orders,
            open_order: None,
            feed,
        })
    }

    /// Track the order currently open in the form, if any
    pub fn set_open_order(&mut self, id: Option<&str>) {
        self.open_order = id.map(String::from);
    }

    /// Merge one delta into the list
    ///
    /// Additions and modifications past `limit` evict the oldest orders.
    pub fn apply(&mut self, change: DocumentChange) -> ListUpdate {
        let is_open = self.open_order.as_deref() == Some(change.id.as_str());

        let open_order = match change.kind {
            ChangeKind::Removed => {
                self.orders.shift_remove(&change.id);
                is_open.then(|| OpenOrderChange::Deleted(change.id.clone()))
            }
            ChangeKind::Added | ChangeKind::Modified => {
                let record = change
                    .data
                    .map(|data| Document::new(change.id.clone(), data))
                    .as_ref()
                    .and_then(parse_record);
                match record {
                    Some(record) => {
                        let open = (is_open && change.kind == ChangeKind::Modified)
                            .then(|| OpenOrderChange::Modified(Box::new(record.clone())));
                        self.orders.insert(change.id.clone(), record);
                        self.evict_oldest();
                        open
                    }
                    None => None,
                }
            }
        };

        tracing::debug!(order_id = %change.id, kind = ?change.kind, "order list delta applied");
        ListUpdate::Delta {
            id: change.id,
            kind: change.kind,
            open_order,
        }
    }

    /// Wait for the next delta and merge it; `None` when the feed closed
    ///
    /// After a lag the whole list is read again and the open order, if any,
    /// is re-fetched and reported as modified or deleted.
    pub async fn next_update(&mut self) -> OrderResult<Option<ListUpdate>> {
        match self.feed.next().await {
            Some(FeedEvent::Change(change)) => Ok(Some(self.apply(change))),
            Some(FeedEvent::Resync { missed }) => self.reload(missed).await.map(Some),
            None => Ok(None),
        }
    }

    async fn reload(&mut self, missed: u64) -> OrderResult<ListUpdate> {
        self.orders = read_newest(self.store.as_ref(), &self.collection, self.limit).await?;

        let open_order = match self.open_order.clone() {
            Some(id) => match self.store.get(&self.collection, &id).await? {
                Some(document) => parse_record(&document)
                    .map(|record| OpenOrderChange::Modified(Box::new(record))),
                None => Some(OpenOrderChange::Deleted(id)),
            },
            None => None,
        };

        tracing::info!(collection = %self.collection, missed, count = self.orders.len(), "order list reloaded after lag");
        Ok(ListUpdate::Reloaded { missed, open_order })
    }

    /// Drop the oldest orders (missing `createdAt` counts as oldest) until
    /// the list fits its limit
    fn evict_oldest(&mut self) {
        while self.orders.len() > self.limit {
            let oldest = self
                .orders
                .values()
                .min_by_key(|r| r.created_at().unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
                .map(|r| r.id.clone());
            let Some(id) = oldest else {
                break;
            };
            self.orders.shift_remove(&id);
            tracing::debug!(order_id = %id, limit = self.limit, "order evicted from list");
        }
    }

    /// Current orders; new arrivals are appended
    pub fn orders(&self) -> Vec<OrderRecord> {
        self.orders.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&OrderRecord> {
        self.orders.get(id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
