//! Macro-generated test suite for `DocumentStore` contract validation.
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_add_and_get` — add assigns an id, get returns the data
//! - `test_get_nonexistent` — get of an unknown id is `None`
//! - `test_get_all_keeps_insertion_order`
//! - `test_set_replaces` — set overwrites the whole document
//! - `test_update_merges` / `test_update_nonexistent`
//! - `test_delete_existing` / `test_delete_nonexistent`
//! - `test_is_empty`
//!
//! ## Queries
//! - `test_query_eq`, `test_query_in`, `test_query_range`
//! - `test_query_order_by_and_limit`
//! - `test_query_timestamp_order`
//!
//! ## Change feed
//! - `test_feed_delivers_deltas`
//! - `test_feed_respects_where_clause`
//!
//! ## Concurrency
//! - `test_concurrent_adds` — parallel adds from spawned tasks

/// Generate a full `DocumentStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to a fresh store
/// implementing `DocumentStore + Clone + 'static`. It is re-evaluated for
/// each test.
#[macro_export]
macro_rules! document_store_tests {
    ($factory:expr) => {
        mod document_store_contract_tests {
            use super::*;
            use printshop::prelude::*;
            use serde_json::json;

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_add_and_get() {
                let store = $factory;
                let id = store.add("orders", order_json("pendente", 10.0, 1)).await.unwrap();
                assert!(!id.is_empty());

                let doc = store.get("orders", &id).await.unwrap().unwrap();
                assert_eq!(doc.id, id);
                assert_eq!(doc.data["status"], "pendente");
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get("orders", "missing").await.unwrap().is_none());
                assert!(store.get("nowhere", "missing").await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_get_all_keeps_insertion_order() {
                let store = $factory;
                for i in 0..5 {
                    store
                        .set("orders", &format!("o{}", i), order_json("pendente", i as f64, i))
                        .await
                        .unwrap();
                }
                let ids: Vec<String> = store
                    .get_all("orders")
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|d| d.id)
                    .collect();
                assert_eq!(ids, vec!["o0", "o1", "o2", "o3", "o4"]);
            }

            #[tokio::test]
            async fn test_set_replaces() {
                let store = $factory;
                store.set("orders", "o1", json!({"a": 1, "b": 2})).await.unwrap();
                store.set("orders", "o1", json!({"a": 3})).await.unwrap();
                let doc = store.get("orders", "o1").await.unwrap().unwrap();
                assert_eq!(doc.data, json!({"a": 3}));
            }

            #[tokio::test]
            async fn test_update_merges() {
                let store = $factory;
                store.set("orders", "o1", json!({"a": 1, "b": 2})).await.unwrap();
                store.update("orders", "o1", json!({"b": 5, "c": 6})).await.unwrap();
                let doc = store.get("orders", "o1").await.unwrap().unwrap();
                assert_eq!(doc.data, json!({"a": 1, "b": 5, "c": 6}));
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let err = store.update("orders", "missing", json!({"a": 1})).await.unwrap_err();
                assert_eq!(err.error_code(), "NOT_FOUND");
            }

            #[tokio::test]
            async fn test_delete_existing() {
                let store = $factory;
                let id = store.add("orders", json!({"a": 1})).await.unwrap();
                store.delete("orders", &id).await.unwrap();
                assert!(store.get("orders", &id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = $factory;
                assert!(store.delete("orders", "missing").await.is_ok());
            }

            #[tokio::test]
            async fn test_is_empty() {
                let store = $factory;
                assert!(store.is_empty("clients").await.unwrap());
                store.add("clients", json!({"name": "Ana"})).await.unwrap();
                assert!(!store.is_empty("clients").await.unwrap());
                assert!(store.is_empty("orders").await.unwrap());
            }

            // ==================================================================
            // Queries
            // ==================================================================

            async fn seeded() -> impl DocumentStore {
                let store = $factory;
                store.set("orders", "a", order_json("pendente", 100.0, 30)).await.unwrap();
                store.set("orders", "b", order_json("pronto", 250.0, 10)).await.unwrap();
                store.set("orders", "c", order_json("entregue", 50.0, 20)).await.unwrap();
                store
            }

            fn ids(docs: Vec<Document>) -> Vec<String> {
                docs.into_iter().map(|d| d.id).collect()
            }

            #[tokio::test]
            async fn test_query_eq() {
                let store = seeded().await;
                let query = Query::new().filter("status", WhereOp::Eq, json!("pronto"));
                assert_eq!(ids(store.query("orders", &query).await.unwrap()), vec!["b"]);

                let query = Query::new().filter("client.name", WhereOp::Eq, json!("Ana Souza"));
                assert_eq!(store.query("orders", &query).await.unwrap().len(), 3);
            }

            #[tokio::test]
            async fn test_query_in() {
                let store = seeded().await;
                let query =
                    Query::new().filter("status", WhereOp::In, json!(["pendente", "entregue"]));
                assert_eq!(ids(store.query("orders", &query).await.unwrap()), vec!["a", "c"]);
            }

            #[tokio::test]
            async fn test_query_range() {
                let store = seeded().await;
                let query = Query::new()
                    .filter("totalValue", WhereOp::Gte, json!(50))
                    .filter("totalValue", WhereOp::Lt, json!(250));
                assert_eq!(ids(store.query("orders", &query).await.unwrap()), vec!["a", "c"]);
            }

            #[tokio::test]
            async fn test_query_order_by_and_limit() {
                let store = seeded().await;
                let query = Query::new()
                    .order_by("totalValue", SortDirection::Desc)
                    .limit(2);
                assert_eq!(ids(store.query("orders", &query).await.unwrap()), vec!["b", "a"]);
            }

            #[tokio::test]
            async fn test_query_timestamp_order() {
                let store = seeded().await;
                let query = Query::new().order_by("createdAt", SortDirection::Asc);
                assert_eq!(
                    ids(store.query("orders", &query).await.unwrap()),
                    vec!["b", "c", "a"]
                );
            }

            // ==================================================================
            // Change feed
            // ==================================================================

            #[tokio::test]
            async fn test_feed_delivers_deltas() {
                let store = $factory;
                let mut feed = store.subscribe("orders", Query::new());

                let id = store.add("orders", json!({"status": "pendente"})).await.unwrap();
                store.update("orders", &id, json!({"status": "pronto"})).await.unwrap();
                store.delete("orders", &id).await.unwrap();

                let added = feed.next().await.and_then(FeedEvent::into_change).unwrap();
                assert_eq!((added.kind, added.id.as_str()), (ChangeKind::Added, id.as_str()));
                let modified = feed.next().await.and_then(FeedEvent::into_change).unwrap();
                assert_eq!(modified.kind, ChangeKind::Modified);
                assert_eq!(modified.data.unwrap()["status"], "pronto");
                let removed = feed.next().await.and_then(FeedEvent::into_change).unwrap();
                assert_eq!(removed.kind, ChangeKind::Removed);
                assert!(removed.data.is_none());
            }

            #[tokio::test]
            async fn test_feed_respects_where_clause() {
                let store = $factory;
                let query = Query::new().filter("status", WhereOp::Eq, json!("pronto"));
                let mut feed = store.subscribe("orders", query);

                store.set("orders", "x", json!({"status": "pendente"})).await.unwrap();
                store.set("clients", "y", json!({"status": "pronto"})).await.unwrap();
                store.set("orders", "z", json!({"status": "pronto"})).await.unwrap();

                let change = feed.next().await.and_then(FeedEvent::into_change).unwrap();
                assert_eq!(change.id, "z");
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_adds() {
                let store = $factory;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move {
                        store.add("orders", json!({"n": i})).await.unwrap()
                    }));
                }
                let mut ids = Vec::new();
                for handle in handles {
                    ids.push(handle.await.unwrap());
                }
                ids.sort();
                ids.dedup();
                assert_eq!(ids.len(), 10);
                assert_eq!(store.get_all("orders").await.unwrap().len(), 10);
            }
        }
    };
}
