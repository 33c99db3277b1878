//! Document storage for the storefront services.
//!
//! Entities are persisted as JSON documents grouped into named collections,
//! the same model as the document database the services were designed
//! against. Two backends implement [`DocumentStore`]: an in-memory store for
//! tests and local runs, and PostgreSQL with one JSONB row per document.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use document::Document;
pub use error::{Result, StoreError};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::DocumentQuery;
pub use store::{DocumentStore, DocumentStoreExt, WriteBatch, WriteOp};
