//! Demo orchestrator.
//!
//! Drives the fixed stage sequence against a [`RemoteOperations`] backend,
//! records run logs, counters and artifacts into the session, and exposes
//! start/stop/reset controls. Callers observe the run through
//! [`DemoOrchestrator::snapshot`] and the event channel rather than a return
//! value.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{GovernanceApi, NewIncident, RemoteError, RemoteOperations};
use crate::config::DemoSettings;
use crate::domain::{
    CounterField, Counters, EvaluationKind, LogEntry, LogLevel, RunEvent, RunOutcome, RunSession,
    RunSnapshot, Stage,
};

use super::activity::{ActivityEntry, ActivityFeed};
use super::export::{scorecard_filename, ExportError, ExportSink};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const ACTIVITY_SOURCE: &str = "demo";

/// How the surrounding application presents a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Stay on one view
    #[default]
    Single,

    /// Navigate to each stage's view before its remote call
    Tour,
}

/// What to run the demo against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Subject model
    pub model_id: String,

    /// System the model belongs to
    pub system_id: String,

    #[serde(default)]
    pub mode: DisplayMode,
}

impl RunOptions {
    pub fn new(model_id: impl Into<String>, system_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            system_id: system_id.into(),
            mode: DisplayMode::Single,
        }
    }

    pub fn tour(mut self) -> Self {
        self.mode = DisplayMode::Tour;
        self
    }
}

struct State {
    session: RunSession,
    options: Option<RunOptions>,
    /// Cancels the active run; the ticker token is a child of it
    cancel: CancellationToken,
}

struct Inner {
    backend: Arc<dyn RemoteOperations>,
    settings: DemoSettings,
    state: Mutex<State>,
    events: broadcast::Sender<RunEvent>,
    activity: Option<ActivityFeed>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Governance demo orchestrator. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct DemoOrchestrator {
    inner: Arc<Inner>,
}

impl DemoOrchestrator {
    /// Create an orchestrator for `backend`
    pub fn new(backend: Arc<dyn RemoteOperations>, settings: DemoSettings) -> Self {
        Self::build(backend, settings, None)
    }

    /// Create an orchestrator that mirrors its run log into `activity`
    pub fn with_activity(
        backend: Arc<dyn RemoteOperations>,
        settings: DemoSettings,
        activity: ActivityFeed,
    ) -> Self {
        Self::build(backend, settings, Some(activity))
    }

    fn build(
        backend: Arc<dyn RemoteOperations>,
        settings: DemoSettings,
        activity: Option<ActivityFeed>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                backend,
                settings,
                state: Mutex::new(State {
                    session: RunSession::default(),
                    options: None,
                    cancel: CancellationToken::new(),
                }),
                events,
                activity,
            }),
        }
    }

    pub fn settings(&self) -> &DemoSettings {
        &self.inner.settings
    }

    /// Receive stage events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.inner.events.subscribe()
    }

    /// Start a run in the background.
    ///
    /// Returns `None` without touching any state when a run is already in
    /// progress. Must be called from within a tokio runtime.
    pub fn start(&self, options: RunOptions) -> Option<JoinHandle<RunOutcome>> {
        let run = self.begin(options)?;
        let this = self.clone();
        Some(tokio::spawn(async move { this.drive(run).await }))
    }

    /// Run to the end on the current task.
    ///
    /// Returns `None` when a run is already in progress.
    pub async fn run(&self, options: RunOptions) -> Option<RunOutcome> {
        let run = self.begin(options)?;
        Some(self.drive(run).await)
    }

    /// Cancel the active run.
    ///
    /// The run stops advancing; a remote call already in flight is left to
    /// finish. Returns `false` when nothing was running.
    pub fn stop(&self) -> bool {
        let mut state = self.inner.state();
        if !state.session.is_running {
            return false;
        }

        state.cancel.cancel();
        state.session.is_running = false;

        let stage = state.session.stage();
        let entry = state
            .session
            .log
            .add_log(stage, "Demo stopped by user", LogLevel::Warning, None)
            .clone();
        let run_id = state.session.run_id;
        drop(state);

        info!(%stage, "Demo stopped by user");
        if let Some(run_id) = run_id {
            self.publish(run_id, &entry);
        }
        true
    }

    /// Stop any active run and return to the idle state
    pub fn reset(&self) {
        self.stop();
        let mut state = self.inner.state();
        state.session = RunSession::default();
        state.options = None;
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.inner.state().session.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state().session.is_running
    }

    pub fn current_stage(&self) -> Stage {
        self.inner.state().session.stage()
    }

    pub fn progress(&self) -> f64 {
        self.inner.state().session.machine.progress()
    }

    pub fn has_scorecard(&self) -> bool {
        self.inner.state().session.artifacts.has_scorecard()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.inner.state().session.elapsed_seconds
    }

    /// Hand the structured scorecard to `sink` as a JSON download
    pub fn export_scorecard(&self, sink: &dyn ExportSink) -> Result<PathBuf, ExportError> {
        let (scorecard, model_id) = {
            let state = self.inner.state();
            let scorecard = state
                .session
                .artifacts
                .scorecard
                .clone()
                .ok_or(ExportError::MissingScorecard)?;
            let model_id = state
                .options
                .as_ref()
                .map(|o| o.model_id.clone())
                .unwrap_or_else(|| "model".to_string());
            (scorecard, model_id)
        };

        sink.download(&scorecard_filename(&model_id), &scorecard)
    }

    /// Hand the printable scorecard to `sink`
    pub fn print_scorecard(&self, sink: &dyn ExportSink) -> Result<PathBuf, ExportError> {
        let html = self
            .inner
            .state()
            .session
            .artifacts
            .scorecard_html
            .clone()
            .ok_or(ExportError::MissingScorecard)?;

        sink.open_printable(&html)
    }

    /// Reset the session for a new run, unless one is already active
    fn begin(&self, options: RunOptions) -> Option<RunContext> {
        let mut state = self.inner.state();
        if state.session.is_running {
            debug!("Start ignored: a run is already in progress");
            return None;
        }

        let run_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let ticker = cancel.child_token();

        state.session.begin(run_id);
        state.options = Some(options.clone());
        state.cancel = cancel.clone();
        drop(state);

        self.spawn_ticker(run_id, ticker.clone());
        self.emit(RunEvent::RunStarted { run_id });

        Some(RunContext {
            run_id,
            options,
            cancel,
            _ticker: TickerGuard(ticker),
        })
    }

    /// One tick per second into `elapsed_seconds` until `token` fires
    fn spawn_ticker(&self, run_id: Uuid, token: CancellationToken) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut interval = interval_at(Instant::now() + period, period);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut state = inner.state();
                        if !state.session.is_current(run_id) || !state.session.is_running {
                            break;
                        }
                        state.session.elapsed_seconds += 1;
                    }
                }
            }
        });
    }

    #[instrument(skip(self, run), fields(run_id = %run.run_id, model = %run.options.model_id))]
    async fn drive(&self, run: RunContext) -> RunOutcome {
        info!(
            mode = ?run.options.mode,
            backend = self.inner.backend.name(),
            "Starting governance demo"
        );

        let mut stages = StageRun {
            orchestrator: self,
            run_id: run.run_id,
            options: &run.options,
            cancel: &run.cancel,
            model_name: None,
        };

        let outcome = match stages.execute().await {
            Ok(Flow::Completed) => RunOutcome::Completed,
            Ok(Flow::Cancelled) => RunOutcome::Cancelled,
            // A stopped run is not a failed run, whatever the late call returned
            Err(e) if run.cancel.is_cancelled() => {
                debug!(error = %e, "Error after cancellation ignored");
                RunOutcome::Cancelled
            }
            Err(e) => {
                let message = e.to_string();
                error!(error = %message, "Governance demo failed");
                self.record_failure(run.run_id, &message);
                RunOutcome::Failed { error: message }
            }
        };

        self.update(run.run_id, |s| s.is_running = false);
        info!(?outcome, "Governance demo finished");
        self.emit(RunEvent::RunFinished {
            run_id: run.run_id,
            outcome: outcome.clone(),
        });

        // `run` drops here, stopping the ticker
        outcome
    }

    fn record_failure(&self, run_id: Uuid, message: &str) {
        let stage = self.update(run_id, |s| s.stage()).unwrap_or(Stage::Error);
        self.log(
            run_id,
            stage,
            LogLevel::Error,
            format!("Demo failed: {}", message),
            None,
        );
        self.update(run_id, |s| {
            s.machine.fail();
            s.error = Some(message.to_string());
        });
    }

    /// Apply `f` to the session if it still belongs to `run_id`
    fn update<R>(&self, run_id: Uuid, f: impl FnOnce(&mut RunSession) -> R) -> Option<R> {
        let mut state = self.inner.state();
        if !state.session.is_current(run_id) {
            return None;
        }
        Some(f(&mut state.session))
    }

    fn log(
        &self,
        run_id: Uuid,
        stage: Stage,
        level: LogLevel,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Option<LogEntry> {
        let message = message.into();
        let entry = self.update(run_id, |s| s.log.add_log(stage, message, level, data).clone())?;
        self.publish(run_id, &entry);
        Some(entry)
    }

    /// Fan a recorded entry out to tracing, the activity feed and subscribers
    fn publish(&self, run_id: Uuid, entry: &LogEntry) {
        match entry.level {
            LogLevel::Info | LogLevel::Success => {
                info!(stage = %entry.stage, "{}", entry.message)
            }
            LogLevel::Warning => warn!(stage = %entry.stage, "{}", entry.message),
            LogLevel::Error => error!(stage = %entry.stage, "{}", entry.message),
        }

        if let Some(ref activity) = self.inner.activity {
            activity.record(ActivityEntry::from_log(ACTIVITY_SOURCE, entry));
        }

        self.emit(RunEvent::Log {
            run_id,
            entry: entry.clone(),
        });
    }

    fn emit(&self, event: RunEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

/// Everything the driver needs for one run
struct RunContext {
    run_id: Uuid,
    options: RunOptions,
    cancel: CancellationToken,
    _ticker: TickerGuard,
}

/// Stops the elapsed-time ticker however the run ends
struct TickerGuard(CancellationToken);

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

enum Flow {
    Completed,
    Cancelled,
}

/// Per-run stage execution
struct StageRun<'a> {
    orchestrator: &'a DemoOrchestrator,
    run_id: Uuid,
    options: &'a RunOptions,
    cancel: &'a CancellationToken,
    /// Display name reported by preflight
    model_name: Option<String>,
}

impl<'a> StageRun<'a> {
    fn settings(&self) -> &'a DemoSettings {
        &self.orchestrator.inner.settings
    }

    fn api(&self) -> GovernanceApi<'a> {
        GovernanceApi::new(
            self.orchestrator.inner.backend.as_ref(),
            &self.options.model_id,
            &self.options.system_id,
            self.cancel,
        )
    }

    fn log(&self, stage: Stage, level: LogLevel, message: impl Into<String>) {
        self.orchestrator.log(self.run_id, stage, level, message, None);
    }

    fn log_with(&self, stage: Stage, level: LogLevel, message: impl Into<String>, data: serde_json::Value) {
        self.orchestrator
            .log(self.run_id, stage, level, message, Some(data));
    }

    fn update<R>(&self, f: impl FnOnce(&mut RunSession) -> R) -> Option<R> {
        self.orchestrator.update(self.run_id, f)
    }

    fn counters(&self) -> Counters {
        self.update(|s| s.log.counters()).unwrap_or_default()
    }

    fn model_label(&self) -> &str {
        self.model_name.as_deref().unwrap_or(&self.options.model_id)
    }

    /// Enter the next stage, unless the run was stopped
    fn advance(&self) -> Option<Stage> {
        self.update(|s| if s.is_running { s.machine.advance() } else { None })
            .flatten()
    }

    /// Sleep for `duration`. Returns `false` if the run was cancelled meanwhile.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    async fn execute(&mut self) -> Result<Flow> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(Flow::Cancelled);
            }

            let Some(stage) = self.advance() else {
                return Ok(Flow::Cancelled);
            };
            self.orchestrator.emit(RunEvent::StageEntered {
                run_id: self.run_id,
                stage,
            });

            if stage == Stage::Complete {
                self.complete();
                return Ok(Flow::Completed);
            }

            self.log(stage, LogLevel::Info, format!("Starting: {}", stage.label()));

            if self.options.mode == DisplayMode::Tour {
                if let Some(path) = stage.tour_path() {
                    self.orchestrator.emit(RunEvent::Navigate {
                        run_id: self.run_id,
                        stage,
                        path: path.to_string(),
                    });
                    if !self.pause(self.settings().navigation_settle).await {
                        return Ok(Flow::Cancelled);
                    }
                }
            }

            self.run_stage(stage).await?;

            if !self.pause(self.settings().stage_delay).await {
                return Ok(Flow::Cancelled);
            }
        }
    }

    async fn run_stage(&mut self, stage: Stage) -> Result<()> {
        if let Some(kind) = stage.evaluation_kind() {
            return self.evaluate(stage, kind).await;
        }

        match stage {
            Stage::Preflight => self.preflight(stage).await,
            Stage::TrafficGeneration => self.generate_traffic(stage).await,
            Stage::DriftDetection => self.detect_drift(stage).await,
            Stage::IncidentCreation => self.create_incident(stage).await,
            Stage::HitlEscalation => self.escalate(stage).await,
            Stage::RedTeam => self.red_team(stage).await,
            Stage::ScorecardGeneration => {
                self.generate_scorecard(stage).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Turn a failed operation into a log entry, or escalate it if fatal
    fn stage_failed(&self, stage: Stage, what: &str, err: RemoteError) -> Result<()> {
        if err.is_fatal() {
            return Err(err.into());
        }
        if err.is_cancelled() {
            debug!(%stage, "Operation cancelled");
            return Ok(());
        }
        self.log(stage, LogLevel::Error, format!("{} failed: {}", what, err));
        Ok(())
    }

    async fn preflight(&mut self, stage: Stage) -> Result<()> {
        let result = self.api().preflight().await;
        match result {
            Ok(report) => {
                let data = json!({
                    "modelName": report.model_name,
                    "systemName": report.system_name,
                });
                if report.ready {
                    self.log_with(
                        stage,
                        LogLevel::Success,
                        format!("Model '{}' is registered and reachable", report.model_name),
                        data,
                    );
                } else {
                    self.log_with(
                        stage,
                        LogLevel::Warning,
                        format!("Model '{}' is registered but not ready", report.model_name),
                        data,
                    );
                }
                self.model_name = Some(report.model_name);
                Ok(())
            }
            Err(e) => self.stage_failed(stage, "Preflight check", e),
        }
    }

    async fn evaluate(&self, stage: Stage, kind: EvaluationKind) -> Result<()> {
        match self.api().run_evaluation(kind).await {
            Ok(result) => {
                self.update(|s| {
                    s.log.increment(CounterField::Evaluations, 1);
                    s.artifacts.evaluation_ids.push(result.run_id.clone());
                });

                let threshold = self.settings().pass_threshold;
                let (level, verdict) = if result.overall_score >= threshold {
                    (LogLevel::Success, "pass")
                } else {
                    (LogLevel::Warning, "below threshold")
                };
                self.log_with(
                    stage,
                    level,
                    format!(
                        "{} scored {:.1} ({}, threshold {:.0})",
                        stage.label(),
                        result.overall_score,
                        verdict,
                        threshold
                    ),
                    json!({ "runId": result.run_id, "overallScore": result.overall_score }),
                );
                Ok(())
            }
            Err(e) => self.stage_failed(stage, stage.label(), e),
        }
    }

    async fn generate_traffic(&self, stage: Stage) -> Result<()> {
        let batch = self.settings().traffic_batch_size;
        let mut sent = 0u64;
        let mut blocked = 0u64;
        let mut failed = 0u64;
        let mut latency_total = 0u64;
        let mut latency_samples = 0u64;
        let mut last_error = None;

        for sequence in 0..batch {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            match self.api().generate_traffic(sequence).await {
                Ok(outcome) => {
                    sent += 1;
                    if outcome.blocked {
                        blocked += 1;
                    }
                    if let Some(latency) = outcome.latency_ms {
                        latency_total += latency;
                        latency_samples += 1;
                    }
                    self.update(|s| {
                        s.log.increment(CounterField::Requests, 1);
                        if outcome.blocked {
                            s.log.increment(CounterField::Blocks, 1);
                        }
                        s.artifacts.traffic_count += 1;
                    });
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) if e.is_cancelled() => return Ok(()),
                Err(e) => {
                    debug!(sequence, error = %e, "Traffic request failed");
                    failed += 1;
                    last_error = Some(e.to_string());
                }
            }
        }

        if let Some(error) = last_error {
            self.log(
                stage,
                LogLevel::Warning,
                format!("{} of {} requests failed (last error: {})", failed, batch, error),
            );
        }

        let avg_latency_ms = (latency_samples > 0).then(|| latency_total / latency_samples);
        let data = json!({
            "requests": sent,
            "blocked": blocked,
            "failed": failed,
            "avgLatencyMs": avg_latency_ms,
        });
        if sent == 0 && batch > 0 {
            self.log_with(stage, LogLevel::Error, "No traffic could be generated", data);
        } else {
            self.log_with(
                stage,
                LogLevel::Success,
                format!("Sent {} requests, {} blocked by guardrails", sent, blocked),
                data,
            );
        }
        Ok(())
    }

    async fn detect_drift(&self, stage: Stage) -> Result<()> {
        match self.api().detect_drift().await {
            Ok(report) => {
                let alerts = report.alerts_created;
                self.update(|s| {
                    s.log.increment(CounterField::DriftAlerts, alerts);
                    s.artifacts.drift_alert_count += alerts;
                });

                if alerts > 0 {
                    self.log(
                        stage,
                        LogLevel::Warning,
                        format!("Drift detected: {} alert(s) raised", alerts),
                    );
                } else {
                    self.log(stage, LogLevel::Success, "No drift detected");
                }
                Ok(())
            }
            Err(e) => self.stage_failed(stage, "Drift detection", e),
        }
    }

    async fn create_incident(&self, stage: Stage) -> Result<()> {
        let counters = self.counters();
        let severity = if counters.drift_alerts > 0 || counters.blocks > 0 {
            "high"
        } else {
            "medium"
        };
        let title = format!("Governance demo: anomalies on {}", self.model_label());
        let description = format!(
            "{} drift alert(s) and {} blocked request(s) observed during demo run {}",
            counters.drift_alerts, counters.blocks, self.run_id
        );

        let result = self
            .api()
            .create_incident(NewIncident {
                title: &title,
                severity,
                description: &description,
            })
            .await;

        match result {
            Ok(receipt) => {
                self.update(|s| {
                    s.log.increment(CounterField::Incidents, 1);
                    s.artifacts.incident_ids.push(receipt.incident_id.clone());
                });
                self.log_with(
                    stage,
                    LogLevel::Success,
                    format!("Incident {} opened (severity {})", receipt.incident_id, severity),
                    json!({ "incidentId": receipt.incident_id, "severity": severity }),
                );
                Ok(())
            }
            Err(e) => self.stage_failed(stage, "Incident creation", e),
        }
    }

    async fn escalate(&self, stage: Stage) -> Result<()> {
        let incident = self
            .update(|s| s.artifacts.latest_incident().map(str::to_string))
            .flatten();
        let reason = match incident {
            Some(ref id) => format!("Incident {} requires human review", id),
            None => "Governance demo findings require human review".to_string(),
        };

        match self.api().escalate_review(incident.as_deref(), &reason).await {
            Ok(escalation) => {
                let items = escalation.items_created;
                self.update(|s| {
                    s.log.increment(CounterField::PendingReviews, items);
                    s.artifacts.hitl_item_count += items;
                });
                self.log(
                    stage,
                    LogLevel::Success,
                    format!("{} item(s) queued for human review", items),
                );
                Ok(())
            }
            Err(e) => self.stage_failed(stage, "Review escalation", e),
        }
    }

    async fn red_team(&self, stage: Stage) -> Result<()> {
        match self.api().run_red_team(&self.settings().attack_types).await {
            Ok(campaign) => {
                self.update(|s| {
                    s.artifacts.red_team_campaign_id = Some(campaign.campaign_id.clone());
                });
                let findings = campaign
                    .findings
                    .map(|n| format!(", {} finding(s)", n))
                    .unwrap_or_default();
                self.log_with(
                    stage,
                    LogLevel::Success,
                    format!("Red-team campaign {} launched{}", campaign.campaign_id, findings),
                    json!({ "campaignId": campaign.campaign_id, "findings": campaign.findings }),
                );
                Ok(())
            }
            Err(e) if e.is_authorization_denied() => {
                warn!(error = %e, "Red-team campaign not authorized");
                self.log(
                    stage,
                    LogLevel::Warning,
                    format!("Red-team campaign SKIPPED (not authorized): {}", e),
                );
                Ok(())
            }
            Err(e) => self.stage_failed(stage, "Red-team campaign", e),
        }
    }

    /// Both representations are best-effort; nothing here ends the run
    async fn generate_scorecard(&self, stage: Stage) {
        match self.api().scorecard().await {
            Ok(scorecard) => {
                self.update(|s| s.artifacts.scorecard = Some(scorecard));
                self.log(stage, LogLevel::Success, "Structured scorecard generated");
            }
            Err(e) => self.best_effort_failed(stage, "Structured scorecard", e),
        }

        match self.api().printable_scorecard().await {
            Ok(printable) => {
                self.update(|s| s.artifacts.scorecard_html = Some(printable.html));
                self.log(stage, LogLevel::Success, "Printable scorecard generated");
            }
            Err(e) => self.best_effort_failed(stage, "Printable scorecard", e),
        }
    }

    fn best_effort_failed(&self, stage: Stage, what: &str, err: RemoteError) {
        if err.is_cancelled() {
            return;
        }
        self.log(stage, LogLevel::Error, format!("{} failed: {}", what, err));
    }

    fn complete(&self) {
        let counters = self.counters();
        self.log_with(
            Stage::Complete,
            LogLevel::Success,
            "Governance demo complete",
            json!({
                "requests": counters.requests,
                "blocks": counters.blocks,
                "incidents": counters.incidents,
                "pendingReviews": counters.pending_reviews,
                "driftAlerts": counters.drift_alerts,
                "evaluations": counters.evaluations,
            }),
        );
    }
}
