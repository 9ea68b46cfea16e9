//! Repository contract over a document collection handle
//!
//! Portable filters translate into the driver's filter-document
//! language before dispatch; sorting and paging are pushed down through
//! `ScanOptions`. The collection handle is owned by the caller and
//! shared; the adapter never tears it down.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tessera_errors::{
    cancelled, invalid_argument, store_failure, store_violation, DataError, DataResult,
    StoreFailure,
};
use tessera_repository::{Filter, PageRequest, Repository, Scalar, Sort};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{CollectionError, DocumentCollection, ScanOptions, SortSpec};
use crate::record::DocumentRecord;

/// Document-store realization of the repository contract for one
/// record type.
pub struct DocumentRepository<R: DocumentRecord> {
    collection: Arc<dyn DocumentCollection>,
    _record: PhantomData<fn() -> R>,
}

impl<R: DocumentRecord> DocumentRepository<R> {
    /// Bind a repository to an injected collection handle.
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            collection,
            _record: PhantomData,
        }
    }

    fn classified(op: &'static str, err: CollectionError) -> DataError {
        let failure = match &err {
            CollectionError::DuplicateId(_) => StoreFailure::ConstraintViolation,
            CollectionError::Codec(_) => StoreFailure::Serialization,
            CollectionError::Unavailable(_) => StoreFailure::Connectivity,
            CollectionError::DeadlineElapsed(_) => StoreFailure::Timeout,
            CollectionError::BadFilter(_) => StoreFailure::Other,
        };
        store_failure(op, failure, err).with_entity(R::NAME)
    }

    fn to_document(op: &'static str, entity: &R) -> DataResult<Value> {
        let document = serde_json::to_value(entity)
            .map_err(|e| store_failure(op, StoreFailure::Serialization, e).with_entity(R::NAME))?;
        if document.get(R::KEY_FIELD).is_none() {
            // The mapping contract: the serialized form carries the key.
            return Err(store_violation(
                op,
                StoreFailure::Serialization,
                format!("serialized document lacks key field '{}'", R::KEY_FIELD),
            )
            .with_entity(R::NAME));
        }
        Ok(document)
    }

    fn from_document(op: &'static str, document: Value) -> DataResult<R> {
        serde_json::from_value(document)
            .map_err(|e| store_failure(op, StoreFailure::Serialization, e).with_entity(R::NAME))
    }

    fn from_documents(op: &'static str, documents: Vec<Value>) -> DataResult<Vec<R>> {
        documents
            .into_iter()
            .map(|document| Self::from_document(op, document))
            .collect()
    }
}

/// Translate a portable filter into a filter document.
///
/// `Like` has no operator in the filter-document language and is
/// rejected here, at the contract boundary.
fn filter_document(op: &str, filter: &Filter) -> DataResult<Value> {
    fn scalar_json(scalar: &Scalar) -> Value {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => json!(b),
            Scalar::Int(i) => json!(i),
            Scalar::Float(f) => json!(f),
            Scalar::Text(t) => json!(t),
        }
    }

    fn operator(field: &str, op_name: &str, scalar: &Scalar) -> Value {
        json!({ field: { op_name: scalar_json(scalar) } })
    }

    match filter {
        Filter::All => Ok(json!({})),
        Filter::Eq(field, scalar) => Ok(operator(field, "$eq", scalar)),
        Filter::Ne(field, scalar) => Ok(operator(field, "$ne", scalar)),
        Filter::Gt(field, scalar) => Ok(operator(field, "$gt", scalar)),
        Filter::Gte(field, scalar) => Ok(operator(field, "$gte", scalar)),
        Filter::Lt(field, scalar) => Ok(operator(field, "$lt", scalar)),
        Filter::Lte(field, scalar) => Ok(operator(field, "$lte", scalar)),
        Filter::Like(field, _) => Err(invalid_argument(
            op,
            format!(
                "LIKE on field '{}' cannot be evaluated server-side by the document store",
                field
            ),
        )),
        Filter::And(parts) if parts.is_empty() => Ok(json!({})),
        Filter::And(parts) => {
            let arms = parts
                .iter()
                .map(|part| filter_document(op, part))
                .collect::<DataResult<Vec<_>>>()?;
            Ok(json!({ "$and": arms }))
        }
        Filter::Or(parts) => {
            let arms = parts
                .iter()
                .map(|part| filter_document(op, part))
                .collect::<DataResult<Vec<_>>>()?;
            Ok(json!({ "$or": arms }))
        }
        Filter::Not(inner) => Ok(json!({ "$not": filter_document(op, inner)? })),
    }
}

/// Race a driver call against the cancellation token.
macro_rules! dispatch {
    ($op:expr, $cancel:expr, $entity:expr, $call:expr) => {{
        if $cancel.is_cancelled() {
            return Err(cancelled($op).with_entity($entity));
        }
        tokio::select! {
            _ = $cancel.cancelled() => Err(cancelled($op).with_entity($entity)),
            result = $call => result.map_err(|e| Self::classified($op, e)),
        }
    }};
}

#[async_trait]
impl<R: DocumentRecord> Repository<R> for DocumentRepository<R> {
    async fn add(&self, entity: R, cancel: &CancellationToken) -> DataResult<R> {
        const OP: &str = "add";

        let id = R::document_id(&entity.key());
        let document = Self::to_document(OP, &entity)?;

        dispatch!(OP, cancel, R::NAME, self.collection.insert(id, document))?;
        debug!(entity = R::NAME, key = %entity.key(), "document inserted");
        Ok(entity)
    }

    async fn find_by_id(
        &self,
        key: &R::Key,
        cancel: &CancellationToken,
    ) -> DataResult<Option<R>> {
        const OP: &str = "find_by_id";

        let id = R::document_id(key);
        let document = dispatch!(OP, cancel, R::NAME, self.collection.get(&id))?;
        document.map(|d| Self::from_document(OP, d)).transpose()
    }

    async fn find_all(&self, cancel: &CancellationToken) -> DataResult<Vec<R>> {
        const OP: &str = "find_all";

        let empty_filter = json!({});
        let scan_opts = ScanOptions::default();
        let documents = dispatch!(
            OP,
            cancel,
            R::NAME,
            self.collection.scan(&empty_filter, &scan_opts)
        )?;
        Self::from_documents(OP, documents)
    }

    async fn find_where(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<R>> {
        const OP: &str = "find_where";

        let filter_doc = filter_document(OP, filter).map_err(|e| e.with_entity(R::NAME))?;
        let scan_opts = ScanOptions::default();
        let documents = dispatch!(
            OP,
            cancel,
            R::NAME,
            self.collection.scan(&filter_doc, &scan_opts)
        )?;
        Self::from_documents(OP, documents)
    }

    async fn find_where_paged(
        &self,
        filter: &Filter,
        page_index: i64,
        page_size: i64,
        sort: Option<Sort>,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<R>> {
        const OP: &str = "find_where_paged";

        let page = PageRequest::new(OP, page_index, page_size)
            .map_err(|e| e.with_entity(R::NAME))?;
        let filter_doc = filter_document(OP, filter).map_err(|e| e.with_entity(R::NAME))?;
        let options = ScanOptions {
            sort: sort.map(|s| SortSpec {
                field: s.field,
                ascending: s.ascending,
            }),
            skip: Some(page.offset()),
            limit: Some(page.size()),
        };

        let documents = dispatch!(
            OP,
            cancel,
            R::NAME,
            self.collection.scan(&filter_doc, &options)
        )?;
        Self::from_documents(OP, documents)
    }

    async fn update(&self, entity: R, cancel: &CancellationToken) -> DataResult<R> {
        const OP: &str = "update";

        let id = R::document_id(&entity.key());
        let document = Self::to_document(OP, &entity)?;

        let replaced = dispatch!(OP, cancel, R::NAME, self.collection.replace(&id, document))?;
        if !replaced {
            return Err(store_violation(
                OP,
                StoreFailure::Conflict,
                format!("identity '{}' is absent from the store", entity.key()),
            )
            .with_entity(R::NAME));
        }
        Ok(entity)
    }

    async fn remove(&self, entity: &R, cancel: &CancellationToken) -> DataResult<()> {
        const OP: &str = "remove";

        let id = R::document_id(&entity.key());
        // Absent ids report false; removal is idempotent.
        dispatch!(OP, cancel, R::NAME, self.collection.delete(&id))?;
        Ok(())
    }
}
