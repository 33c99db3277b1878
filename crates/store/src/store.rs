use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::{Document, DocumentQuery, Result};

/// A single write inside a [`WriteBatch`].
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Inserts a new document; fails if the id is taken.
    Insert {
        collection: String,
        document: Document,
    },
    /// Replaces the body of an existing document; fails if it is missing.
    Replace {
        collection: String,
        document: Document,
    },
}

impl WriteOp {
    pub fn collection(&self) -> &str {
        match self {
            WriteOp::Insert { collection, .. } | WriteOp::Replace { collection, .. } => collection,
        }
    }

    pub fn document(&self) -> &Document {
        match self {
            WriteOp::Insert { document, .. } | WriteOp::Replace { document, .. } => document,
        }
    }
}

/// Writes that are committed together: either all of them apply or none do.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an insert to the batch.
    pub fn insert(mut self, collection: impl Into<String>, document: Document) -> Self {
        self.ops.push(WriteOp::Insert {
            collection: collection.into(),
            document,
        });
        self
    }

    /// Adds a replace to the batch.
    pub fn replace(mut self, collection: impl Into<String>, document: Document) -> Self {
        self.ops.push(WriteOp::Replace {
            collection: collection.into(),
            document,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Core trait for document store implementations.
///
/// All implementations must be thread-safe (Send + Sync). Single-document
/// writes are atomic; multi-document atomicity is only available through
/// [`DocumentStore::commit`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a new document.
    ///
    /// Fails with `AlreadyExists` if the id is taken in the collection.
    async fn insert(&self, collection: &str, document: Document) -> Result<()>;

    /// Retrieves a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Replaces an existing document's body, keeping its creation time.
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn replace(&self, collection: &str, document: Document) -> Result<()>;

    /// Retrieves documents matching a query, oldest first.
    async fn find(&self, collection: &str, query: DocumentQuery) -> Result<Vec<Document>>;

    /// Applies every write in the batch atomically.
    async fn commit(&self, batch: WriteBatch) -> Result<()>;
}

/// Extension trait providing typed convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Returns the first document matching a query.
    async fn find_one(&self, collection: &str, query: DocumentQuery) -> Result<Option<Document>> {
        Ok(self
            .find(collection, query.limit(1))
            .await?
            .into_iter()
            .next())
    }

    /// Loads and decodes an entity by id.
    async fn get_entity<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        match self.get(collection, id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Finds and decodes the first entity matching a query.
    async fn find_one_entity<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: DocumentQuery,
    ) -> Result<Option<T>> {
        match self.find_one(collection, query).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Finds and decodes every entity matching a query.
    async fn find_entities<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: DocumentQuery,
    ) -> Result<Vec<T>> {
        self.find(collection, query)
            .await?
            .iter()
            .map(Document::decode)
            .collect()
    }

    /// Serializes and inserts an entity.
    async fn insert_entity<T: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        entity: &T,
    ) -> Result<()> {
        self.insert(collection, Document::from_entity(id, entity)?)
            .await
    }

    /// Serializes and replaces an entity.
    async fn replace_entity<T: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        entity: &T,
    ) -> Result<()> {
        self.replace(collection, Document::from_entity(id, entity)?)
            .await
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Validates a batch before any of its writes are applied.
pub fn validate_batch(batch: &WriteBatch) -> std::result::Result<(), String> {
    if batch.is_empty() {
        return Err("Cannot commit an empty write batch".to_string());
    }

    for (i, op) in batch.ops().iter().enumerate() {
        let duplicate = batch.ops()[..i].iter().any(|earlier| {
            earlier.collection() == op.collection() && earlier.document().id == op.document().id
        });
        if duplicate {
            return Err(format!(
                "Document {}/{} is written more than once in the same batch",
                op.collection(),
                op.document().id
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_batch_is_rejected() {
        assert!(validate_batch(&WriteBatch::new()).is_err());
    }

    #[test]
    fn duplicate_targets_are_rejected() {
        let batch = WriteBatch::new()
            .insert("cart", Document::new("c-1", json!({})))
            .replace("cart", Document::new("c-1", json!({})));
        assert!(validate_batch(&batch).is_err());
    }

    #[test]
    fn same_id_in_different_collections_is_allowed() {
        let batch = WriteBatch::new()
            .insert("cart", Document::new("x", json!({})))
            .replace("customer", Document::new("x", json!({})));
        assert!(validate_batch(&batch).is_ok());
    }
}
