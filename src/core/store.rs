//! Document store abstraction
//!
//! The order engine treats the remote database as an opaque document store:
//! named collections of JSON documents keyed by string ids, basic CRUD and a
//! change feed. Backends live in [`crate::storage`].

use crate::core::error::OrderResult;
use crate::core::events::ChangeFeed;
use crate::core::query::Query;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored document: its id plus the raw data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Deserialize the document data into a typed record
    pub fn parse<T: DeserializeOwned>(&self) -> OrderResult<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Collection-oriented document store
///
/// Implementations are agnostic to the order domain; they only move JSON.
/// Writes are last-write-wins, there is no version check.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a whole collection
    async fn get_all(&self, collection: &str) -> OrderResult<Vec<Document>>;

    /// Filtered/ordered/limited read
    async fn query(&self, collection: &str, query: &Query) -> OrderResult<Vec<Document>>;

    /// Read one document, `None` when absent
    async fn get(&self, collection: &str, id: &str) -> OrderResult<Option<Document>>;

    /// Insert a document under a store-assigned id and return that id
    async fn add(&self, collection: &str, data: Value) -> OrderResult<String>;

    /// Create or replace the document at `id`
    async fn set(&self, collection: &str, id: &str, data: Value) -> OrderResult<()>;

    /// Merge top-level fields of `data` into an existing document
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn update(&self, collection: &str, id: &str, data: Value) -> OrderResult<()>;

    /// Remove a document; removing a missing document is not an error
    async fn delete(&self, collection: &str, id: &str) -> OrderResult<()>;

    /// Subscribe to added/modified/removed deltas matching `query`
    fn subscribe(&self, collection: &str, query: Query) -> ChangeFeed;

    /// Whether a collection holds no documents
    async fn is_empty(&self, collection: &str) -> OrderResult<bool> {
        Ok(self.query(collection, &Query::new().limit(1)).await?.is_empty())
    }
}
