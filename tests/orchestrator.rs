//! Orchestrator Integration Tests
//!
//! Drive full demo runs against scripted backends and check stage order,
//! failure handling, cancellation and session resets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use govrun::adapters::governance::{
    OP_DETECT_DRIFT, OP_GENERATE_SCORECARD, OP_GENERATE_TRAFFIC, OP_PREFLIGHT, OP_RUN_EVALUATION,
    OP_RUN_REDTEAM,
};
use govrun::adapters::{RemoteError, RemoteOperations, ScriptedBackend};
use govrun::config::DemoSettings;
use govrun::core::{DemoOrchestrator, RunOptions};
use govrun::domain::{Counters, LogLevel, RunArtifacts, RunEvent, RunOutcome, Stage};

fn fast_settings() -> DemoSettings {
    DemoSettings::default().without_delays()
}

fn options() -> RunOptions {
    RunOptions::new("credit-scorer", "lending")
}

fn orchestrator_for(backend: Arc<dyn RemoteOperations>) -> DemoOrchestrator {
    DemoOrchestrator::new(backend, fast_settings())
}

/// Runs a callback with the orchestrator after every call to the inner backend
struct HookBackend {
    inner: ScriptedBackend,
    orchestrator: OnceLock<DemoOrchestrator>,
    hook: Box<dyn Fn(&DemoOrchestrator, &str, &Value) + Send + Sync>,
}

impl HookBackend {
    fn new(hook: impl Fn(&DemoOrchestrator, &str, &Value) + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            inner: ScriptedBackend::new(),
            orchestrator: OnceLock::new(),
            hook: Box::new(hook),
        })
    }

    fn attach(self: &Arc<Self>) -> DemoOrchestrator {
        let orchestrator = orchestrator_for(self.clone());
        let _ = self.orchestrator.set(orchestrator.clone());
        orchestrator
    }
}

#[async_trait]
impl RemoteOperations for HookBackend {
    fn name(&self) -> &str {
        "hook"
    }

    async fn invoke(
        &self,
        operation: &str,
        args: Value,
        cancel: &CancellationToken,
    ) -> Result<Value, RemoteError> {
        let result = self.inner.invoke(operation, args.clone(), cancel).await;
        if let Some(orchestrator) = self.orchestrator.get() {
            (self.hook)(orchestrator, operation, &args);
        }
        result
    }
}

/// Holds calls to one operation until released; ignores cancellation
struct GatedBackend {
    inner: ScriptedBackend,
    gated: &'static str,
    entered: Notify,
    release: Notify,
}

impl GatedBackend {
    fn new(gated: &'static str) -> Arc<Self> {
        Arc::new(Self {
            inner: ScriptedBackend::new(),
            gated,
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl RemoteOperations for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    async fn invoke(
        &self,
        operation: &str,
        args: Value,
        _cancel: &CancellationToken,
    ) -> Result<Value, RemoteError> {
        if operation == self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner
            .invoke(operation, args, &CancellationToken::new())
            .await
    }
}

#[tokio::test]
async fn test_full_run_follows_canonical_order() {
    let backend = Arc::new(ScriptedBackend::new());
    let orchestrator = orchestrator_for(backend.clone());

    let outcome = orchestrator.run(options()).await;
    assert_eq!(outcome, Some(RunOutcome::Completed));

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.logged_stages(), Stage::SEQUENCE.to_vec());
    assert_eq!(snapshot.stage, Stage::Complete);
    assert_eq!(snapshot.progress, 1.0);
    assert!(snapshot.error.is_none());
    assert!(!orchestrator.is_running());

    // Every operation was called with the subject model
    assert!(backend
        .calls()
        .iter()
        .all(|call| call.args["modelId"] == "credit-scorer"));
}

#[tokio::test]
async fn test_progress_is_monotonic() {
    let samples = Arc::new(Mutex::new(Vec::new()));
    let recorded = samples.clone();
    let backend = HookBackend::new(move |orchestrator, _, _| {
        recorded.lock().unwrap().push(orchestrator.progress());
    });
    let orchestrator = backend.attach();

    orchestrator.run(options()).await;

    let samples = samples.lock().unwrap().clone();
    assert_eq!(samples.first(), Some(&0.0));
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(orchestrator.progress(), 1.0);
}

#[tokio::test]
async fn test_start_clears_previous_run() {
    let orchestrator = orchestrator_for(Arc::new(ScriptedBackend::new()));
    orchestrator.run(options()).await;
    let first = orchestrator.snapshot();
    assert!(!first.logs.is_empty());

    let handle = orchestrator.start(options()).unwrap();

    // The spawned run has not been polled yet on this single-threaded runtime
    let fresh = orchestrator.snapshot();
    assert!(fresh.logs.is_empty());
    assert_eq!(fresh.counters, Counters::default());
    assert_eq!(fresh.artifacts, RunArtifacts::default());
    assert_eq!(fresh.stage, Stage::Idle);
    assert!(fresh.is_running);
    assert_ne!(fresh.run_id, first.run_id);

    assert_eq!(handle.await.unwrap(), RunOutcome::Completed);
    let second = orchestrator.snapshot();
    assert_eq!(second.logs.len(), first.logs.len());
    assert!(second.logs.iter().all(|e| !first.logs.iter().any(|f| f.id == e.id)));
}

#[tokio::test]
async fn test_start_while_running_is_noop() {
    let backend = GatedBackend::new(OP_PREFLIGHT);
    let orchestrator = orchestrator_for(backend.clone());

    let handle = orchestrator.start(options()).unwrap();
    backend.entered.notified().await;

    let before = orchestrator.snapshot();
    assert!(before.is_running);
    assert_eq!(before.stage, Stage::Preflight);

    assert!(orchestrator.start(RunOptions::new("other", "other")).is_none());
    assert!(orchestrator.run(options()).await.is_none());

    let after = orchestrator.snapshot();
    assert_eq!(after.run_id, before.run_id);
    assert_eq!(after.stage, before.stage);
    assert_eq!(after.logs, before.logs);
    assert_eq!(after.counters, before.counters);

    backend.release.notify_one();
    assert_eq!(handle.await.unwrap(), RunOutcome::Completed);
}

#[tokio::test]
async fn test_traffic_counters_follow_responses() {
    let backend = Arc::new(ScriptedBackend::new());
    for blocked in [true, false, false, true, true, false] {
        backend.push(OP_GENERATE_TRAFFIC, Ok(json!({ "blocked": blocked })));
    }

    let mut settings = fast_settings();
    settings.traffic_batch_size = 6;
    let orchestrator = DemoOrchestrator::new(backend.clone(), settings);
    orchestrator.run(options()).await;

    let snapshot = orchestrator.snapshot();
    assert_eq!(backend.call_count(OP_GENERATE_TRAFFIC), 6);
    assert_eq!(snapshot.counters.requests, 6);
    assert_eq!(snapshot.counters.blocks, 3);
    assert_eq!(snapshot.artifacts.traffic_count, 6);
}

#[tokio::test]
async fn test_rejected_traffic_is_not_counted() {
    let backend = Arc::new(ScriptedBackend::new());
    backend
        .push(OP_GENERATE_TRAFFIC, Ok(json!({ "blocked": true })))
        .push(OP_GENERATE_TRAFFIC, Err(RemoteError::rejected("rate limited")))
        .push(OP_GENERATE_TRAFFIC, Ok(json!({ "blocked": false })));

    let mut settings = fast_settings();
    settings.traffic_batch_size = 3;
    let orchestrator = DemoOrchestrator::new(backend, settings);
    orchestrator.run(options()).await;

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.counters.requests, 2);
    assert_eq!(snapshot.counters.blocks, 1);

    let warning = snapshot
        .logs_for(Stage::TrafficGeneration)
        .find(|e| e.level == LogLevel::Warning)
        .expect("summary warning for failed requests");
    assert!(warning.message.contains("1 of 3"));
    assert!(warning.message.contains("rate limited"));
}

#[tokio::test]
async fn test_traffic_summary_reports_latency() {
    let backend = Arc::new(ScriptedBackend::new());
    backend
        .push(OP_GENERATE_TRAFFIC, Ok(json!({ "blocked": false, "latencyMs": 100 })))
        .push(OP_GENERATE_TRAFFIC, Ok(json!({ "blocked": true, "latencyMs": 300 })));

    let mut settings = fast_settings();
    settings.traffic_batch_size = 2;
    let orchestrator = DemoOrchestrator::new(backend, settings);
    orchestrator.run(options()).await;

    let snapshot = orchestrator.snapshot();
    let summary = snapshot
        .logs_for(Stage::TrafficGeneration)
        .find(|e| e.level == LogLevel::Success)
        .unwrap();
    let data = summary.data.as_ref().unwrap();
    assert_eq!(data["requests"], 2);
    assert_eq!(data["blocked"], 1);
    assert_eq!(data["avgLatencyMs"], 200);
}

#[tokio::test]
async fn test_stop_between_traffic_calls() {
    let traffic_calls = Arc::new(AtomicUsize::new(0));
    let seen = traffic_calls.clone();
    let backend = HookBackend::new(move |orchestrator, operation, _| {
        if operation == OP_GENERATE_TRAFFIC && seen.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
            orchestrator.stop();
        }
    });
    let orchestrator = backend.attach();

    let outcome = orchestrator.run(options()).await;
    assert_eq!(outcome, Some(RunOutcome::Cancelled));

    let snapshot = orchestrator.snapshot();
    assert_eq!(backend.inner.call_count(OP_GENERATE_TRAFFIC), 3);
    assert_eq!(snapshot.counters.requests, 3);
    assert_eq!(snapshot.stage, Stage::TrafficGeneration);
    assert_eq!(snapshot.logs_for(Stage::DriftDetection).count(), 0);
    assert_eq!(backend.inner.call_count(OP_DETECT_DRIFT), 0);
}

#[tokio::test]
async fn test_transport_failure_during_traffic_is_fatal() {
    let backend = Arc::new(ScriptedBackend::new());
    backend
        .push(OP_GENERATE_TRAFFIC, Ok(json!({ "blocked": false })))
        .push(OP_GENERATE_TRAFFIC, Ok(json!({ "blocked": true })))
        .push(OP_GENERATE_TRAFFIC, Err(RemoteError::transport("connection reset")));
    let orchestrator = orchestrator_for(backend.clone());

    let outcome = orchestrator.run(options()).await;
    assert_eq!(
        outcome,
        Some(RunOutcome::Failed {
            error: "connection reset".to_string()
        })
    );

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.stage, Stage::Error);
    assert_eq!(snapshot.error.as_deref(), Some("connection reset"));
    assert_eq!(snapshot.counters.requests, 2);
    assert_eq!(snapshot.counters.blocks, 1);
    assert_eq!(backend.call_count(OP_GENERATE_TRAFFIC), 3);
    assert_eq!(snapshot.logged_stages().last(), Some(&Stage::TrafficGeneration));
}

#[tokio::test]
async fn test_malformed_payload_does_not_stop_run() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push(
        OP_RUN_EVALUATION,
        Ok(json!({ "runId": "ev-bad", "overallScore": "high" })),
    );
    let orchestrator = orchestrator_for(backend);

    let outcome = orchestrator.run(options()).await;
    assert_eq!(outcome, Some(RunOutcome::Completed));

    let snapshot = orchestrator.snapshot();
    let error = snapshot
        .logs_for(Stage::EvalFairness)
        .find(|e| e.level == LogLevel::Error)
        .expect("error entry for the malformed evaluation");
    assert!(error.message.contains("unexpected response from 'run-evaluation'"));
    assert_eq!(snapshot.counters.evaluations, 4);
    assert!(!snapshot.artifacts.evaluation_ids.contains(&"ev-bad".to_string()));
    assert_eq!(snapshot.stage, Stage::Complete);
}

#[tokio::test]
async fn test_passing_evaluations_log_success() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.respond(OP_RUN_EVALUATION, json!({ "runId": "ev-85", "overallScore": 85 }));
    let orchestrator = orchestrator_for(backend);

    orchestrator.run(options()).await;

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.artifacts.evaluation_ids.len(), 5);
    assert_eq!(snapshot.counters.evaluations, 5);

    let eval_stages: Vec<Stage> = Stage::SEQUENCE
        .iter()
        .copied()
        .filter(|s| s.evaluation_kind().is_some())
        .collect();
    assert_eq!(eval_stages.len(), 5);

    for stage in eval_stages {
        let results: Vec<_> = snapshot
            .logs_for(stage)
            .filter(|e| e.level != LogLevel::Info)
            .collect();
        assert_eq!(results.len(), 1, "one result entry for {stage}");
        assert_eq!(results[0].level, LogLevel::Success);
        assert_eq!(results[0].data.as_ref().unwrap()["overallScore"], 85.0);
    }
}

#[tokio::test]
async fn test_low_score_logs_warning() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.respond(OP_RUN_EVALUATION, json!({ "runId": "ev-low", "overallScore": 69.9 }));
    let orchestrator = orchestrator_for(backend);

    orchestrator.run(options()).await;

    let snapshot = orchestrator.snapshot();
    let entry = snapshot
        .logs_for(Stage::EvalFairness)
        .find(|e| e.level != LogLevel::Info)
        .unwrap();
    assert_eq!(entry.level, LogLevel::Warning);
    assert!(entry.message.contains("below threshold"));
}

#[tokio::test]
async fn test_failed_evaluation_does_not_stop_run() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.push(
        OP_RUN_EVALUATION,
        Err(RemoteError::rejected("evaluation worker crashed")),
    );
    let orchestrator = orchestrator_for(backend);

    let outcome = orchestrator.run(options()).await;
    assert_eq!(outcome, Some(RunOutcome::Completed));

    let snapshot = orchestrator.snapshot();
    let error = snapshot
        .logs_for(Stage::EvalFairness)
        .find(|e| e.level == LogLevel::Error)
        .unwrap();
    assert!(error.message.contains("evaluation worker crashed"));
    assert_eq!(snapshot.artifacts.evaluation_ids.len(), 4);
    assert_eq!(snapshot.logged_stages(), Stage::SEQUENCE.to_vec());
}

#[tokio::test]
async fn test_forbidden_red_team_is_skipped() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.fail(
        OP_RUN_REDTEAM,
        RemoteError::rejected("403 Forbidden: admin required"),
    );
    let orchestrator = orchestrator_for(backend);

    let outcome = orchestrator.run(options()).await;
    assert_eq!(outcome, Some(RunOutcome::Completed));

    let snapshot = orchestrator.snapshot();
    let skipped: Vec<_> = snapshot
        .logs_for(Stage::RedTeam)
        .filter(|e| e.level != LogLevel::Info)
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].level, LogLevel::Warning);
    assert!(skipped[0].message.contains("SKIPPED"));

    assert!(snapshot.logged_stages().contains(&Stage::ScorecardGeneration));
    assert_eq!(snapshot.stage, Stage::Complete);
    assert!(snapshot.artifacts.red_team_campaign_id.is_none());
    assert!(snapshot.has_scorecard);
}

#[tokio::test]
async fn test_structured_forbidden_red_team_is_skipped() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.fail(OP_RUN_REDTEAM, RemoteError::forbidden("role lacks red-team scope"));
    let orchestrator = orchestrator_for(backend);

    orchestrator.run(options()).await;

    let snapshot = orchestrator.snapshot();
    assert!(snapshot
        .logs_for(Stage::RedTeam)
        .any(|e| e.level == LogLevel::Warning && e.message.contains("SKIPPED")));
    assert_eq!(snapshot.stage, Stage::Complete);
}

#[tokio::test]
async fn test_transport_failure_is_fatal() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.fail(OP_DETECT_DRIFT, RemoteError::transport("network down"));
    let orchestrator = orchestrator_for(backend);

    let outcome = orchestrator.run(options()).await;
    assert_eq!(
        outcome,
        Some(RunOutcome::Failed {
            error: "network down".to_string()
        })
    );

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.stage, Stage::Error);
    assert_eq!(snapshot.error.as_deref(), Some("network down"));
    assert!(!snapshot.is_running);

    let logged = snapshot.logged_stages();
    assert_eq!(logged.last(), Some(&Stage::DriftDetection));
    let drift = Stage::DriftDetection.position().unwrap();
    assert!(logged.iter().all(|s| s.position().unwrap() <= drift));

    // Progress stays where the run failed
    assert_eq!(snapshot.progress, drift as f64 / 12.0);
}

#[tokio::test]
async fn test_scorecard_failures_are_best_effort() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.fail(OP_GENERATE_SCORECARD, RemoteError::transport("gateway timeout"));
    let orchestrator = orchestrator_for(backend);

    let outcome = orchestrator.run(options()).await;
    assert_eq!(outcome, Some(RunOutcome::Completed));

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.has_scorecard);
    let errors = snapshot
        .logs_for(Stage::ScorecardGeneration)
        .filter(|e| e.level == LogLevel::Error)
        .count();
    assert_eq!(errors, 2);
}

#[tokio::test]
async fn test_partial_scorecard_counts() {
    let backend = Arc::new(ScriptedBackend::new());
    backend
        .push(OP_GENERATE_SCORECARD, Ok(json!({ "grade": "A" })))
        .push(OP_GENERATE_SCORECARD, Err(RemoteError::rejected("renderer offline")));
    let orchestrator = orchestrator_for(backend);

    orchestrator.run(options()).await;

    let snapshot = orchestrator.snapshot();
    assert!(snapshot.has_scorecard);
    assert_eq!(snapshot.artifacts.scorecard, Some(json!({ "grade": "A" })));
    assert!(snapshot.artifacts.scorecard_html.is_none());
}

#[tokio::test]
async fn test_stop_after_fairness() {
    let backend = HookBackend::new(|orchestrator, operation, args| {
        if operation == OP_RUN_EVALUATION && args["evaluationType"] == "fairness" {
            assert!(orchestrator.stop());
            assert!(!orchestrator.is_running());
        }
    });
    let orchestrator = backend.attach();

    let outcome = orchestrator.run(options()).await;
    assert_eq!(outcome, Some(RunOutcome::Cancelled));

    let snapshot = orchestrator.snapshot();
    assert!(!snapshot.is_running);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.stage, Stage::EvalFairness);
    assert!(snapshot
        .logs
        .iter()
        .any(|e| e.message.contains("stopped by user") && e.stage == Stage::EvalFairness));
    assert_eq!(snapshot.logs_for(Stage::EvalToxicity).count(), 0);
    assert_eq!(
        backend
            .inner
            .calls()
            .iter()
            .filter(|c| c.args["evaluationType"] == "toxicity")
            .count(),
        0
    );
}

#[tokio::test]
async fn test_reset_is_idempotent() {
    let orchestrator = orchestrator_for(Arc::new(ScriptedBackend::new()));
    orchestrator.run(options()).await;
    assert!(!orchestrator.snapshot().logs.is_empty());

    orchestrator.reset();
    let first = orchestrator.snapshot();
    orchestrator.reset();
    let second = orchestrator.snapshot();

    assert_eq!(first, second);
    assert_eq!(first.stage, Stage::Idle);
    assert!(first.logs.is_empty());
    assert_eq!(first.counters, Counters::default());
    assert_eq!(first.artifacts, RunArtifacts::default());
    assert_eq!(first.elapsed_seconds, 0);
    assert!(first.error.is_none());
    assert!(!first.is_running);
}

#[tokio::test]
async fn test_reset_discards_late_results() {
    let backend = GatedBackend::new(OP_PREFLIGHT);
    let orchestrator = orchestrator_for(backend.clone());

    let handle = orchestrator.start(options()).unwrap();
    backend.entered.notified().await;

    orchestrator.reset();
    backend.release.notify_one();

    assert_eq!(handle.await.unwrap(), RunOutcome::Cancelled);
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.stage, Stage::Idle);
    assert!(snapshot.logs.is_empty());
    assert!(snapshot.run_id.is_none());
}

#[tokio::test]
async fn test_tour_mode_emits_navigation() {
    let orchestrator = orchestrator_for(Arc::new(ScriptedBackend::new()));
    let mut events = orchestrator.subscribe();

    orchestrator.run(options().tour()).await;

    let mut paths = Vec::new();
    let mut finished = None;
    while let Ok(event) = events.try_recv() {
        match event {
            RunEvent::Navigate { stage, path, .. } => paths.push((stage, path)),
            RunEvent::RunFinished { outcome, .. } => finished = Some(outcome),
            _ => {}
        }
    }

    assert_eq!(paths.len(), 12);
    assert_eq!(paths[0], (Stage::Preflight, "/models".to_string()));
    assert!(paths.contains(&(Stage::IncidentCreation, "/incidents".to_string())));
    assert_eq!(finished, Some(RunOutcome::Completed));
}

#[tokio::test]
async fn test_single_mode_emits_no_navigation() {
    let orchestrator = orchestrator_for(Arc::new(ScriptedBackend::new()));
    let mut events = orchestrator.subscribe();

    orchestrator.run(options()).await;

    while let Ok(event) = events.try_recv() {
        assert!(!matches!(event, RunEvent::Navigate { .. }));
    }
}
