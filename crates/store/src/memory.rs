use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Document, DocumentQuery, Result, StoreError,
    store::{DocumentStore, WriteBatch, WriteOp, validate_batch},
};

type Collections = HashMap<String, HashMap<String, Document>>;

/// In-memory document store implementation for testing.
///
/// This implementation keeps every collection in memory and provides
/// the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, HashMap::len)
    }

    /// Clears every collection.
    pub async fn clear(&self) {
        self.collections.write().await.clear();
    }

    fn apply_insert(collections: &mut Collections, collection: &str, document: Document) -> Result<()> {
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&document.id) {
            return Err(StoreError::already_exists(collection, &document.id));
        }
        docs.insert(document.id.clone(), document);
        Ok(())
    }

    fn apply_replace(
        collections: &mut Collections,
        collection: &str,
        mut document: Document,
    ) -> Result<()> {
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(&document.id))
            .ok_or_else(|| StoreError::not_found(collection, &document.id))?;

        document.created_at = existing.created_at;
        document.updated_at = Utc::now();
        *existing = document;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        Self::apply_insert(&mut collections, collection, document)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn replace(&self, collection: &str, document: Document) -> Result<()> {
        let mut collections = self.collections.write().await;
        Self::apply_replace(&mut collections, collection, document)
    }

    async fn find(&self, collection: &str, query: DocumentQuery) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut docs: Vec<_> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| query.matches(&doc.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        // Sort by insertion time then id
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let offset = query.offset.unwrap_or(0);
        let docs = docs.into_iter().skip(offset);
        let docs = match query.limit {
            Some(limit) => docs.take(limit).collect(),
            None => docs.collect(),
        };

        Ok(docs)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        validate_batch(&batch).map_err(StoreError::InvalidBatch)?;

        let mut collections = self.collections.write().await;

        // Check every precondition before touching anything
        for op in batch.ops() {
            let exists = collections
                .get(op.collection())
                .is_some_and(|docs| docs.contains_key(&op.document().id));
            match op {
                WriteOp::Insert { collection, document } if exists => {
                    return Err(StoreError::already_exists(collection, &document.id));
                }
                WriteOp::Replace { collection, document } if !exists => {
                    return Err(StoreError::not_found(collection, &document.id));
                }
                _ => {}
            }
        }

        for op in batch.into_ops() {
            match op {
                WriteOp::Insert { collection, document } => {
                    Self::apply_insert(&mut collections, &collection, document)?
                }
                WriteOp::Replace { collection, document } => {
                    Self::apply_replace(&mut collections, &collection, document)?
                }
            }
        }

        Ok(())
    }
}
