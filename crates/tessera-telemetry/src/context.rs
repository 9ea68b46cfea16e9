//! Per-operation telemetry context
//!
//! Lifecycle: open on entry to an instrumented call, append structured
//! entries while the operation runs, close on return or failure, then
//! enqueue to a sink. The context is owned by the single logical call
//! that opened it and is never shared across concurrent operations.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tessera_core_types::SpanId;

/// How the instrumented operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
    Cancelled,
}

/// Structured diagnostic record for one logical operation.
#[derive(Debug, Clone)]
pub struct TelemetryContext {
    span_id: SpanId,
    operation: String,
    entity: Option<String>,
    entries: Vec<(String, Value)>,
    opened_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    outcome: Option<Outcome>,
}

impl TelemetryContext {
    /// Open a context for the named operation.
    pub fn open(operation: impl Into<String>) -> Self {
        Self {
            span_id: SpanId::new(),
            operation: operation.into(),
            entity: None,
            entries: Vec::new(),
            opened_at: Utc::now(),
            closed_at: None,
            outcome: None,
        }
    }

    /// Attach the entity-type label this operation works on.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Append a structured entry.
    ///
    /// # Panics
    ///
    /// Panics when the context is already closed. Appending after
    /// close is a programming error in the instrumentation layer, not
    /// a recoverable condition.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        assert!(
            self.closed_at.is_none(),
            "telemetry context for '{}' is already closed",
            self.operation
        );
        self.entries.push((key.into(), value.into()));
    }

    /// Seal the context with the operation's outcome.
    ///
    /// # Panics
    ///
    /// Panics on double close.
    pub fn close(&mut self, outcome: Outcome) {
        assert!(
            self.closed_at.is_none(),
            "telemetry context for '{}' is already closed",
            self.operation
        );
        self.closed_at = Some(Utc::now());
        self.outcome = Some(outcome);
    }

    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    /// First entry value recorded under `key`, if any.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Wall-clock duration between open and close, once closed.
    pub fn duration_ms(&self) -> Option<i64> {
        self.closed_at
            .map(|closed| (closed - self.opened_at).num_milliseconds())
    }
}
