//! PostgreSQL integration tests
//!
//! These tests start a shared PostgreSQL container and need Docker, so they
//! are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored --test-threads=1
//! ```

use std::sync::Arc;

use serde_json::json;
use serial_test::serial;
use sqlx::PgPool;
use store::{
    Document, DocumentQuery, DocumentStore, DocumentStoreExt, PostgresDocumentStore, StoreError,
    WriteBatch,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_documents_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and a cleared table
async fn get_test_store() -> PostgresDocumentStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE documents")
        .execute(&pool)
        .await
        .unwrap();

    PostgresDocumentStore::new(pool)
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn insert_and_get_document() {
    let store = get_test_store().await;

    store
        .insert("cart", Document::new("c-1", json!({"userID": "u-1", "items": []})))
        .await
        .unwrap();

    let doc = store.get("cart", "c-1").await.unwrap().unwrap();
    assert_eq!(doc.body["userID"], "u-1");
    assert!(store.get("cart", "c-2").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn duplicate_insert_maps_to_already_exists() {
    let store = get_test_store().await;

    store
        .insert("cart", Document::new("c-1", json!({})))
        .await
        .unwrap();
    let result = store.insert("cart", Document::new("c-1", json!({}))).await;

    assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn replace_missing_document_is_not_found() {
    let store = get_test_store().await;
    let result = store.replace("cart", Document::new("ghost", json!({}))).await;
    assert!(matches!(result, Err(StoreError::NotFound { .. })));
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn find_uses_jsonb_containment() {
    let store = get_test_store().await;

    for (id, catalog, active) in [
        ("d-1", "cat-1", true),
        ("d-2", "cat-1", false),
        ("d-3", "cat-2", true),
    ] {
        store
            .insert(
                "discount",
                Document::new(id, json!({"catalogID": catalog, "isActive": active})),
            )
            .await
            .unwrap();
    }

    let found = store
        .find(
            "discount",
            DocumentQuery::new().eq("catalogID", "cat-1").eq("isActive", true),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "d-1");

    let first = store
        .find_one("discount", DocumentQuery::new().eq("isActive", true))
        .await
        .unwrap();
    assert!(first.is_some());
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn failed_batch_rolls_back() {
    let store = get_test_store().await;

    let batch = WriteBatch::new()
        .insert("cart", Document::new("c-1", json!({})))
        .replace("customer", Document::new("missing", json!({})));
    let result = store.commit(batch).await;

    assert!(matches!(result, Err(StoreError::NotFound { .. })));
    assert!(store.get("cart", "c-1").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn successful_batch_commits_every_write() {
    let store = get_test_store().await;

    store
        .insert("customer", Document::new("cu-1", json!({"cartID": null})))
        .await
        .unwrap();

    let batch = WriteBatch::new()
        .insert("cart", Document::new("c-1", json!({"userID": "u-1"})))
        .replace("customer", Document::new("cu-1", json!({"cartID": "c-1"})));
    store.commit(batch).await.unwrap();

    let customer = store.get("customer", "cu-1").await.unwrap().unwrap();
    assert_eq!(customer.body["cartID"], "c-1");
    assert!(store.get("cart", "c-1").await.unwrap().is_some());
}
