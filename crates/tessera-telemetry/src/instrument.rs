//! Instrumented repository decorator
//!
//! Wraps any repository with the telemetry contract: one context per
//! call, opened on entry, closed and enqueued on every exit path -
//! success, failure and cancellation. Call sites hold the same
//! `Repository<E>` surface and cannot tell they are instrumented; the
//! wrapper is composed by the registration layer, never by the caller.
//!
//! Result recording is shape-only (row counts, key presence), never
//! full payloads, to bound telemetry volume. Inner errors are already
//! taxonomy errors, so they are recorded and re-raised unchanged -
//! translation never double-wraps.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_core_types::Entity;
use tessera_errors::{DataErrorKind, DataResult};
use tessera_repository::{Filter, Repository, Sort};
use tokio_util::sync::CancellationToken;

use crate::context::{Outcome, TelemetryContext};
use crate::sink::TelemetrySink;

/// Telemetry decorator around an inner repository.
pub struct Instrumented<R> {
    inner: R,
    sink: Arc<dyn TelemetrySink>,
}

impl<R> Instrumented<R> {
    pub fn new(inner: R, sink: Arc<dyn TelemetrySink>) -> Self {
        Self { inner, sink }
    }
}

/// Record the outcome, close the context and hand it to the sink.
/// Runs on every exit path; a context is never leaked half-open.
fn close_and_enqueue<T>(
    mut ctx: TelemetryContext,
    sink: &Arc<dyn TelemetrySink>,
    result: &DataResult<T>,
) {
    match result {
        Ok(_) => ctx.close(Outcome::Completed),
        Err(err) => {
            ctx.append("error_code", err.code());
            if let Some(failure) = err.failure() {
                ctx.append("error_class", failure.code());
            }
            ctx.append("error", err.to_string());
            let outcome = if err.kind() == DataErrorKind::Cancelled {
                Outcome::Cancelled
            } else {
                Outcome::Failed
            };
            ctx.close(outcome);
        }
    }
    sink.enqueue(ctx);
}

#[async_trait]
impl<E, R> Repository<E> for Instrumented<R>
where
    E: Entity,
    R: Repository<E>,
{
    async fn add(&self, entity: E, cancel: &CancellationToken) -> DataResult<E> {
        let mut ctx = TelemetryContext::open("repository.add").with_entity(E::NAME);

        let result = self.inner.add(entity, cancel).await;
        if let Ok(persisted) = &result {
            ctx.append("key", persisted.key().to_string());
        }
        close_and_enqueue(ctx, &self.sink, &result);
        result
    }

    async fn find_by_id(
        &self,
        key: &E::Key,
        cancel: &CancellationToken,
    ) -> DataResult<Option<E>> {
        let mut ctx = TelemetryContext::open("repository.find_by_id").with_entity(E::NAME);
        ctx.append("key", key.to_string());

        let result = self.inner.find_by_id(key, cancel).await;
        if let Ok(found) = &result {
            ctx.append("found", found.is_some());
        }
        close_and_enqueue(ctx, &self.sink, &result);
        result
    }

    async fn find_all(&self, cancel: &CancellationToken) -> DataResult<Vec<E>> {
        let mut ctx = TelemetryContext::open("repository.find_all").with_entity(E::NAME);

        let result = self.inner.find_all(cancel).await;
        if let Ok(rows) = &result {
            ctx.append("row_count", rows.len() as u64);
        }
        close_and_enqueue(ctx, &self.sink, &result);
        result
    }

    async fn find_where(
        &self,
        filter: &Filter,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<E>> {
        let mut ctx = TelemetryContext::open("repository.find_where").with_entity(E::NAME);
        ctx.append("filter", format!("{:?}", filter));

        let result = self.inner.find_where(filter, cancel).await;
        if let Ok(rows) = &result {
            ctx.append("row_count", rows.len() as u64);
        }
        close_and_enqueue(ctx, &self.sink, &result);
        result
    }

    async fn find_where_paged(
        &self,
        filter: &Filter,
        page_index: i64,
        page_size: i64,
        sort: Option<Sort>,
        cancel: &CancellationToken,
    ) -> DataResult<Vec<E>> {
        let mut ctx =
            TelemetryContext::open("repository.find_where_paged").with_entity(E::NAME);
        ctx.append("filter", format!("{:?}", filter));
        ctx.append("page_index", page_index);
        ctx.append("page_size", page_size);
        if let Some(sort) = &sort {
            ctx.append("sort", format!("{:?}", sort));
        }

        let result = self
            .inner
            .find_where_paged(filter, page_index, page_size, sort, cancel)
            .await;
        if let Ok(rows) = &result {
            ctx.append("row_count", rows.len() as u64);
        }
        close_and_enqueue(ctx, &self.sink, &result);
        result
    }

    async fn update(&self, entity: E, cancel: &CancellationToken) -> DataResult<E> {
        let mut ctx = TelemetryContext::open("repository.update").with_entity(E::NAME);
        ctx.append("key", entity.key().to_string());

        let result = self.inner.update(entity, cancel).await;
        close_and_enqueue(ctx, &self.sink, &result);
        result
    }

    async fn remove(&self, entity: &E, cancel: &CancellationToken) -> DataResult<()> {
        let mut ctx = TelemetryContext::open("repository.remove").with_entity(E::NAME);
        ctx.append("key", entity.key().to_string());

        let result = self.inner.remove(entity, cancel).await;
        close_and_enqueue(ctx, &self.sink, &result);
        result
    }
}
