//! Narrow driver surface for a document collection
//!
//! The adapter depends on this trait the way the relational adapter
//! depends on a connection handle: the wire protocol behind it is
//! opaque. Filter documents use the Mongo-style operator language:
//! `{"field": {"$gt": 5}}`, `{"$and": [...]}`, `{"$or": [...]}`,
//! `{"$not": {...}}`; a bare scalar is equality; `{}` matches all.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Native failure raised by a document driver.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("duplicate document id '{0}'")]
    DuplicateId(String),

    #[error("malformed filter document: {0}")]
    BadFilter(String),

    #[error("document codec failure: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("collection unavailable: {0}")]
    Unavailable(String),

    #[error("driver deadline elapsed after {0}ms")]
    DeadlineElapsed(u64),
}

/// Server-side sort key for a scan.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub ascending: bool,
}

/// Server-side scan shaping: sort, skip, limit.
///
/// Drivers apply the sort before skip/limit and add a document-id
/// tiebreak so scans are stable.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub sort: Option<SortSpec>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// The opaque document driver the adapter is written against.
///
/// Document ids are strings; entity keys are rendered through their
/// canonical `Display` form.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Insert a document under `id`. Fails with `DuplicateId` when the
    /// id is already present.
    async fn insert(&self, id: String, document: Value) -> Result<(), CollectionError>;

    /// Replace the document under `id`. `Ok(false)` when the id is
    /// absent.
    async fn replace(&self, id: &str, document: Value) -> Result<bool, CollectionError>;

    /// Delete the document under `id`. `Ok(false)` when the id was
    /// absent.
    async fn delete(&self, id: &str) -> Result<bool, CollectionError>;

    /// Fetch the document under `id`.
    async fn get(&self, id: &str) -> Result<Option<Value>, CollectionError>;

    /// Return documents matching `filter`, shaped by `options`.
    /// Without a sort, documents come back in the store's default
    /// order (document-id order for the in-memory driver).
    async fn scan(
        &self,
        filter: &Value,
        options: &ScanOptions,
    ) -> Result<Vec<Value>, CollectionError>;
}
