use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    Document, DocumentQuery, Result, StoreError,
    store::{DocumentStore, WriteBatch, WriteOp, validate_batch},
};

const PRIMARY_KEY_CONSTRAINT: &str = "documents_pkey";

/// PostgreSQL-backed document store implementation.
///
/// Every document is one row of the `documents` table, keyed by
/// `(collection, id)` with its body in a JSONB column.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            id: row.try_get("id")?,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn insert_in(
        tx: &mut Transaction<'_, Postgres>,
        collection: &str,
        document: &Document,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(collection)
        .bind(&document.id)
        .bind(&document.body)
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(PRIMARY_KEY_CONSTRAINT)
            {
                return StoreError::already_exists(collection, &document.id);
            }
            StoreError::Database(e)
        })?;
        Ok(())
    }

    async fn replace_in(
        tx: &mut Transaction<'_, Postgres>,
        collection: &str,
        document: &Document,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents SET body = $3, updated_at = $4
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(&document.id)
        .bind(&document.body)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, &document.id));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::insert_in(&mut tx, collection, &document).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT id, body, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn replace(&self, collection: &str, document: Document) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::replace_in(&mut tx, collection, &document).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, collection: &str, query: DocumentQuery) -> Result<Vec<Document>> {
        let mut sql = String::from(
            "SELECT id, body, created_at, updated_at FROM documents WHERE collection = $1 AND body @> $2 ORDER BY created_at ASC, id ASC",
        );
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        let rows = sqlx::query(&sql)
            .bind(collection)
            .bind(query.as_containment())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        validate_batch(&batch).map_err(StoreError::InvalidBatch)?;

        // Dropping the transaction on error rolls every write back
        let mut tx = self.pool.begin().await?;
        for op in batch.ops() {
            match op {
                WriteOp::Insert { collection, document } => {
                    Self::insert_in(&mut tx, collection, document).await?
                }
                WriteOp::Replace { collection, document } => {
                    Self::replace_in(&mut tx, collection, document).await?
                }
            }
        }
        tx.commit().await?;

        tracing::debug!(writes = batch.ops().len(), "write batch committed");
        metrics::counter!("store_batches_committed_total").increment(1);
        Ok(())
    }
}
