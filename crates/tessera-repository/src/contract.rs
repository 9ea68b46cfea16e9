//! The repository contract
//!
//! One polymorphic interface over CRUD, predicate querying and paging,
//! implemented independently by each store adapter. Repositories are
//! bound to one entity type and one injected store handle; they are
//! stateless across calls and never own the handle's lifecycle.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_core_types::Entity;
use tessera_errors::DataResult;
use tokio_util::sync::CancellationToken;

use crate::filter::{Filter, Sort};

/// Uniform asynchronous data-access surface.
///
/// All methods are re-entrant and safe to call concurrently on the same
/// repository instance, provided the injected store handle supports
/// concurrent use; the repository imposes no additional locking.
///
/// Failure contract: store-originated failures surface only as
/// `ERR_STORE_OPERATION` with the native error retained as the cause;
/// argument violations as `ERR_INVALID_ARGUMENT`; cancellation as
/// `ERR_CANCELLED`. A cancelled operation never leaks a half-open
/// telemetry context when instrumentation is active.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Insert `entity` into the store.
    ///
    /// Returns the persisted entity, with the store-assigned identity
    /// populated when the store generates keys on insert.
    async fn add(&self, entity: E, cancel: &CancellationToken) -> DataResult<E>;

    /// Fetch the entity with the given identity.
    ///
    /// An absent identity is `Ok(None)`, never an error.
    async fn find_by_id(
        &self,
        key: &E::Key,
        cancel: &CancellationToken,
    ) -> DataResult<Option<E>>;

    /// Fetch every entity of the bound type, ordered by identity.
    ///
    /// No implicit limit is applied. Bounding the result on large
    /// stores is the caller's responsibility.
    async fn find_all(&self, cancel: &CancellationToken) -> DataResult<Vec<E>>;

    /// Fetch every entity satisfying `filter`.
    ///
    /// The predicate is evaluated by the store, not the client;
    /// constructs the store cannot evaluate server-side are rejected
    /// with `ERR_INVALID_ARGUMENT`.
    async fn find_where(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<E>>;

    /// Fetch one page of entities satisfying `filter`.
    ///
    /// `page_index` is zero-based; `page_size <= 0` or `page_index < 0`
    /// fail with `ERR_INVALID_ARGUMENT`. When `sort` is `None` the
    /// store-default order applies, with the identity added as a stable
    /// tiebreak.
    async fn find_where_paged(
        &self,
        filter: &Filter,
        page_index: i64,
        page_size: i64,
        sort: Option<Sort>,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<E>>;

    /// Apply field changes to an entity matched by identity.
    ///
    /// The entity must already exist; updating an absent identity fails
    /// with `ERR_STORE_OPERATION` (`ERR_STORE_CONFLICT`).
    async fn update(&self, entity: E, cancel: &CancellationToken) -> DataResult<E>;

    /// Delete the entity matched by identity.
    ///
    /// Removing a non-existent identity is a no-op success.
    async fn remove(&self, entity: &E, cancel: &CancellationToken) -> DataResult<()>;
}

// Delegation so `Arc<dyn Repository<E>>` satisfies the contract and can
// be wrapped by decorators composed at registration time.
#[async_trait]
impl<E, T> Repository<E> for Arc<T>
where
    E: Entity,
    T: Repository<E> + ?Sized,
{
    async fn add(&self, entity: E, cancel: &CancellationToken) -> DataResult<E> {
        (**self).add(entity, cancel).await
    }

    async fn find_by_id(
        &self,
        key: &E::Key,
        cancel: &CancellationToken,
    ) -> DataResult<Option<E>> {
        (**self).find_by_id(key, cancel).await
    }

    async fn find_all(&self, cancel: &CancellationToken) -> DataResult<Vec<E>> {
        (**self).find_all(cancel).await
    }

    async fn find_where(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<E>> {
        (**self).find_where(filter, cancel).await
    }

    async fn find_where_paged(
        &self,
        filter: &Filter,
        page_index: i64,
        page_size: i64,
        sort: Option<Sort>,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<E>> {
        (**self)
            .find_where_paged(filter, page_index, page_size, sort, cancel)
            .await
    }

    async fn update(&self, entity: E, cancel: &CancellationToken) -> DataResult<E> {
        (**self).update(entity, cancel).await
    }

    async fn remove(&self, entity: &E, cancel: &CancellationToken) -> DataResult<()> {
        (**self).remove(entity, cancel).await
    }
}
