//! Tessera telemetry - per-operation context, instrumentation and the
//! request pipeline
//!
//! Provides:
//! - `TelemetryContext` - open/append/close lifecycle, enqueued to a
//!   sink once per logical operation
//! - `TelemetrySink` - out-of-band delivery (channel, memory, null)
//! - `Instrumented` - repository decorator adding telemetry and error
//!   recording around any repository, composed at registration time
//! - the mediator pipeline (`Request`/`Handler`/`PipelineBehavior`/
//!   `Pipeline`) with `TelemetryBehavior` for request-level spans
//! - `TelemetrySettings` and the registration helpers that install (or
//!   skip) the wrappers
//! - `logging::init` - tracing-subscriber profiles for the workspace

pub mod context;
pub mod instrument;
pub mod logging;
pub mod pipeline;
pub mod registration;
pub mod sink;

pub use context::{Outcome, TelemetryContext};
pub use instrument::Instrumented;
pub use pipeline::{Handler, Next, Pipeline, PipelineBehavior, Request, TelemetryBehavior};
pub use registration::{build_pipeline, instrument_repository, TelemetrySettings};
pub use sink::{ChannelSink, MemorySink, NullSink, TelemetrySink};
