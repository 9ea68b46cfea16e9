//! Telemetry sinks
//!
//! A sink accepts closed contexts out-of-band: `enqueue` never blocks
//! the instrumented call and never fails it. Delivery is fire-and-
//! forget; what happens past the sink is the observability backend's
//! concern.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::warn;

use crate::context::TelemetryContext;

/// Out-of-band receiver of closed telemetry contexts.
pub trait TelemetrySink: Send + Sync {
    /// Accept a closed context. Must not block and must not fail the
    /// instrumented operation.
    fn enqueue(&self, context: TelemetryContext);
}

/// Sink backed by an unbounded channel; a consumer drains the receiver
/// elsewhere (exporter task, log writer, ...).
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<TelemetryContext>,
}

impl ChannelSink {
    /// Create a sink and the receiver its consumer drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TelemetryContext>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelSink {
    fn enqueue(&self, context: TelemetryContext) {
        // A dropped consumer must not fail the instrumented call.
        if self.tx.send(context).is_err() {
            warn!("telemetry consumer dropped; context discarded");
        }
    }
}

/// Sink that keeps every context in memory, for test assertions.
#[derive(Default)]
pub struct MemorySink {
    contexts: Arc<Mutex<Vec<TelemetryContext>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every enqueued context, in arrival order.
    pub fn contexts(&self) -> Vec<TelemetryContext> {
        self.contexts.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.contexts.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assert exactly one context was enqueued for `operation` and
    /// return it.
    ///
    /// # Panics
    ///
    /// Panics when zero or several contexts match.
    pub fn single(&self, operation: &str) -> TelemetryContext {
        let matching: Vec<_> = self
            .contexts()
            .into_iter()
            .filter(|c| c.operation() == operation)
            .collect();
        assert_eq!(
            matching.len(),
            1,
            "expected exactly one context for '{}', found {}",
            operation,
            matching.len()
        );
        matching.into_iter().next().unwrap()
    }
}

impl TelemetrySink for MemorySink {
    fn enqueue(&self, context: TelemetryContext) {
        if let Ok(mut contexts) = self.contexts.lock() {
            contexts.push(context);
        }
    }
}

/// Sink that discards everything.
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn enqueue(&self, _context: TelemetryContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Outcome;

    fn closed(operation: &str) -> TelemetryContext {
        let mut ctx = TelemetryContext::open(operation);
        ctx.close(Outcome::Completed);
        ctx
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let sink = MemorySink::new();
        sink.enqueue(closed("a"));
        sink.enqueue(closed("b"));

        let ops: Vec<String> = sink
            .contexts()
            .iter()
            .map(|c| c.operation().to_string())
            .collect();
        assert_eq!(ops, vec!["a", "b"]);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_to_consumer() {
        let (sink, mut rx) = ChannelSink::channel();
        sink.enqueue(closed("repository.add"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.operation(), "repository.add");
    }

    #[test]
    fn test_channel_sink_survives_dropped_consumer() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);
        sink.enqueue(closed("a"));
    }
}
