//! Registration surface
//!
//! The composition root decides what gets wrapped, driven by one
//! feature flag. When telemetry is disabled no wrapper is installed
//! and calls pass through uninstrumented - zero contexts are opened.

use std::sync::Arc;

use serde::Deserialize;
use tessera_core_types::Entity;
use tessera_repository::Repository;

use crate::instrument::Instrumented;
use crate::pipeline::{Handler, Pipeline, Request, TelemetryBehavior};
use crate::sink::TelemetrySink;

/// Telemetry feature flag, bound from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub enabled: bool,
}

impl TelemetrySettings {
    pub fn enabled() -> Self {
        Self { enabled: true }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }
}

/// Wrap a repository with telemetry when the flag is on; hand the
/// original back untouched otherwise.
pub fn instrument_repository<E: Entity>(
    settings: &TelemetrySettings,
    sink: &Arc<dyn TelemetrySink>,
    repository: Arc<dyn Repository<E>>,
) -> Arc<dyn Repository<E>> {
    if settings.enabled {
        Arc::new(Instrumented::new(repository, Arc::clone(sink)))
    } else {
        repository
    }
}

/// Build a pipeline for `handler`, installing the telemetry behavior
/// only when the flag is on.
pub fn build_pipeline<R: Request>(
    settings: &TelemetrySettings,
    sink: &Arc<dyn TelemetrySink>,
    handler: Arc<dyn Handler<R>>,
) -> Pipeline<R> {
    let pipeline = Pipeline::new(handler);
    if settings.enabled {
        pipeline.with_behavior(Arc::new(TelemetryBehavior::new(Arc::clone(sink))))
    } else {
        pipeline
    }
}
