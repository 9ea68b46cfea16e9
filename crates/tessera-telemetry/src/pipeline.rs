//! In-process request pipeline
//!
//! A mediator-style request/response dispatch: a terminal handler per
//! request type, wrapped by zero or more behaviors. `TelemetryBehavior`
//! performs the open/record/close contract at request granularity,
//! independent of repository-level instrumentation - both layers may
//! fire for one end-to-end operation (coarse request span plus fine
//! repository span), and that is intentional.

use std::sync::Arc;

use async_trait::async_trait;
use tessera_errors::{DataErrorKind, DataResult};
use tokio_util::sync::CancellationToken;

use crate::context::{Outcome, TelemetryContext};
use crate::sink::TelemetrySink;

/// An in-process request.
pub trait Request: Send + 'static {
    type Response: Send;

    /// Stable request name, used as the telemetry operation label.
    const NAME: &'static str;
}

/// Terminal handler for one request type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, cancel: &CancellationToken)
        -> DataResult<R::Response>;
}

/// Middleware stage around one request/response pair.
#[async_trait]
pub trait PipelineBehavior<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        cancel: &CancellationToken,
    ) -> DataResult<R::Response>;
}

/// Continuation into the remaining pipeline stages.
pub struct Next<'a, R: Request> {
    behaviors: &'a [Arc<dyn PipelineBehavior<R>>],
    handler: &'a dyn Handler<R>,
}

impl<'a, R: Request> Next<'a, R> {
    /// Run the rest of the pipeline for `request`.
    pub async fn run(
        self,
        request: R,
        cancel: &CancellationToken,
    ) -> DataResult<R::Response> {
        match self.behaviors.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    behaviors: rest,
                    handler: self.handler,
                };
                stage.handle(request, next, cancel).await
            }
            None => self.handler.handle(request, cancel).await,
        }
    }
}

/// A handler composed with its behaviors.
///
/// Behaviors run in registration order, outermost first.
pub struct Pipeline<R: Request> {
    behaviors: Vec<Arc<dyn PipelineBehavior<R>>>,
    handler: Arc<dyn Handler<R>>,
}

impl<R: Request> Pipeline<R> {
    pub fn new(handler: Arc<dyn Handler<R>>) -> Self {
        Self {
            behaviors: Vec::new(),
            handler,
        }
    }

    pub fn with_behavior(mut self, behavior: Arc<dyn PipelineBehavior<R>>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Dispatch a request through the behaviors into the handler.
    pub async fn send(&self, request: R, cancel: &CancellationToken) -> DataResult<R::Response> {
        let next = Next {
            behaviors: &self.behaviors,
            handler: self.handler.as_ref(),
        };
        next.run(request, cancel).await
    }
}

/// Request-level telemetry stage.
pub struct TelemetryBehavior {
    sink: Arc<dyn TelemetrySink>,
}

impl TelemetryBehavior {
    pub fn new(sink: Arc<dyn TelemetrySink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl<R: Request> PipelineBehavior<R> for TelemetryBehavior {
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        cancel: &CancellationToken,
    ) -> DataResult<R::Response> {
        let mut ctx = TelemetryContext::open(format!("request.{}", R::NAME));

        let result = next.run(request, cancel).await;
        match &result {
            Ok(_) => {
                ctx.append("result", "ok");
                ctx.close(Outcome::Completed);
            }
            Err(err) => {
                ctx.append("error_code", err.code());
                ctx.append("error", err.to_string());
                let outcome = if err.kind() == DataErrorKind::Cancelled {
                    Outcome::Cancelled
                } else {
                    Outcome::Failed
                };
                ctx.close(outcome);
            }
        }
        self.sink.enqueue(ctx);
        result
    }
}
