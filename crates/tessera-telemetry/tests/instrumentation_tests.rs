mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{failing_repository, plain_repository, seed, Account};
use serde_json::Value;
use tessera_errors::{DataErrorKind, DataResult};
use tessera_repository::{Filter, Repository, Sort};
use tessera_telemetry::{
    build_pipeline, instrument_repository, Handler, MemorySink, Outcome, Request,
    TelemetrySettings, TelemetrySink,
};
use tokio_util::sync::CancellationToken;

fn memory_sink() -> (Arc<MemorySink>, Arc<dyn TelemetrySink>) {
    let sink = Arc::new(MemorySink::new());
    let dyn_sink: Arc<dyn TelemetrySink> = sink.clone();
    (sink, dyn_sink)
}

// ===== registration flag =====

#[tokio::test]
async fn test_disabled_telemetry_opens_no_contexts() {
    let (sink, dyn_sink) = memory_sink();
    let repo = instrument_repository(
        &TelemetrySettings::disabled(),
        &dyn_sink,
        plain_repository(),
    );
    let cancel = CancellationToken::new();

    seed(&repo, 3).await;
    repo.find_all(&cancel).await.unwrap();
    repo.find_by_id(&1, &cancel).await.unwrap();

    assert!(sink.is_empty(), "disabled telemetry must open no contexts");
}

#[tokio::test]
async fn test_enabled_telemetry_opens_one_context_per_call() {
    let (sink, dyn_sink) = memory_sink();
    let repo = instrument_repository(
        &TelemetrySettings::enabled(),
        &dyn_sink,
        plain_repository(),
    );
    let cancel = CancellationToken::new();

    repo.add(Account::new(1, "TITLE"), &cancel).await.unwrap();
    repo.find_by_id(&1, &cancel).await.unwrap();
    repo.find_all(&cancel).await.unwrap();

    assert_eq!(sink.len(), 3);
    for ctx in sink.contexts() {
        assert!(ctx.is_closed(), "every enqueued context must be closed");
        assert_eq!(ctx.outcome(), Some(Outcome::Completed));
        assert_eq!(ctx.entity(), Some("account"));
    }
}

// ===== success recording =====

#[tokio::test]
async fn test_success_records_result_shape_not_payload() {
    let (sink, dyn_sink) = memory_sink();
    let repo = instrument_repository(
        &TelemetrySettings::enabled(),
        &dyn_sink,
        plain_repository(),
    );
    let cancel = CancellationToken::new();

    seed(&repo, 5).await;
    repo.find_all(&cancel).await.unwrap();

    let ctx = sink.single("repository.find_all");
    assert_eq!(ctx.entry("row_count"), Some(&Value::from(5u64)));
    // Shape only: entity payloads never land in telemetry entries.
    for (_, value) in ctx.entries() {
        if let Value::String(s) = value {
            assert!(!s.contains("TITLE"), "payload leaked into telemetry: {}", s);
        }
    }
}

#[tokio::test]
async fn test_find_by_id_records_key_and_found() {
    let (sink, dyn_sink) = memory_sink();
    let repo = instrument_repository(
        &TelemetrySettings::enabled(),
        &dyn_sink,
        plain_repository(),
    );
    let cancel = CancellationToken::new();

    repo.find_by_id(&7, &cancel).await.unwrap();

    let ctx = sink.single("repository.find_by_id");
    assert_eq!(ctx.entry("key"), Some(&Value::from("7")));
    assert_eq!(ctx.entry("found"), Some(&Value::from(false)));
}

// ===== failure path =====

#[tokio::test]
async fn test_failure_records_and_reraises_unchanged() {
    let (sink, dyn_sink) = memory_sink();
    let repo = instrument_repository(
        &TelemetrySettings::enabled(),
        &dyn_sink,
        failing_repository(),
    );
    let cancel = CancellationToken::new();

    let err = repo.find_all(&cancel).await.unwrap_err();
    // Re-raised as the taxonomy error the adapter produced; the
    // decorator never double-wraps.
    assert_eq!(err.kind(), DataErrorKind::StoreOperation);
    assert!(std::error::Error::source(&err).is_some());

    let ctx = sink.single("repository.find_all");
    assert_eq!(ctx.outcome(), Some(Outcome::Failed));
    assert_eq!(
        ctx.entry("error_code"),
        Some(&Value::from("ERR_STORE_OPERATION"))
    );
    assert!(ctx.is_closed());
}

#[tokio::test]
async fn test_invalid_argument_failure_still_produces_one_context() {
    let (sink, dyn_sink) = memory_sink();
    let repo = instrument_repository(
        &TelemetrySettings::enabled(),
        &dyn_sink,
        plain_repository(),
    );
    let cancel = CancellationToken::new();

    let err = repo
        .find_where_paged(&Filter::All, -1, 10, Some(Sort::asc("id")), &cancel)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::InvalidArgument);

    let ctx = sink.single("repository.find_where_paged");
    assert_eq!(ctx.outcome(), Some(Outcome::Failed));
}

// ===== cancellation path =====

#[tokio::test]
async fn test_cancelled_call_still_closes_and_enqueues() {
    let (sink, dyn_sink) = memory_sink();
    let repo = instrument_repository(
        &TelemetrySettings::enabled(),
        &dyn_sink,
        plain_repository(),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = repo.find_all(&cancel).await.unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::Cancelled);

    let ctx = sink.single("repository.find_all");
    assert_eq!(ctx.outcome(), Some(Outcome::Cancelled));
    assert!(ctx.is_closed(), "context must never leak on cancellation");
}

// ===== pipeline + repository, both layers =====

struct CountActive;

impl Request for CountActive {
    type Response = usize;
    const NAME: &'static str = "count_active";
}

struct CountActiveHandler {
    repo: Arc<dyn Repository<Account>>,
}

#[async_trait]
impl Handler<CountActive> for CountActiveHandler {
    async fn handle(
        &self,
        _request: CountActive,
        cancel: &CancellationToken,
    ) -> DataResult<usize> {
        let matched = self
            .repo
            .find_where(&Filter::eq("active", true), cancel)
            .await?;
        Ok(matched.len())
    }
}

#[tokio::test]
async fn test_request_and_repository_layers_both_fire() {
    let (sink, dyn_sink) = memory_sink();
    let settings = TelemetrySettings::enabled();

    let repo = instrument_repository(&settings, &dyn_sink, plain_repository());
    seed(&repo, 4).await;
    let before = sink.len();

    let pipeline = build_pipeline(
        &settings,
        &dyn_sink,
        Arc::new(CountActiveHandler { repo }) as Arc<dyn Handler<CountActive>>,
    );
    let cancel = CancellationToken::new();

    let count = pipeline.send(CountActive, &cancel).await.unwrap();
    assert_eq!(count, 4);

    // One coarse request span plus one fine repository span.
    assert_eq!(sink.len() - before, 2);
    sink.single("request.count_active");
    sink.single("repository.find_where");
}

#[tokio::test]
async fn test_disabled_pipeline_passes_through() {
    let (sink, dyn_sink) = memory_sink();
    let settings = TelemetrySettings::disabled();

    let repo = instrument_repository(&settings, &dyn_sink, plain_repository());
    seed(&repo, 2).await;

    let pipeline = build_pipeline(
        &settings,
        &dyn_sink,
        Arc::new(CountActiveHandler { repo }) as Arc<dyn Handler<CountActive>>,
    );
    let cancel = CancellationToken::new();

    let count = pipeline.send(CountActive, &cancel).await.unwrap();
    assert_eq!(count, 2);
    assert!(sink.is_empty());
}
