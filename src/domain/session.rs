//! Run session state owned by the orchestrator.
//!
//! A session is the mutable state of the current (or last) run. Readers get
//! a [`RunSnapshot`] clone rather than a reference.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artifact::RunArtifacts;
use super::log::{Counters, LogEntry, RunLog};
use super::stage::{Stage, StageMachine};

/// Mutable state of one orchestrator's run
#[derive(Debug, Clone, Default)]
pub struct RunSession {
    /// Run the session currently belongs to (`None` when idle)
    pub run_id: Option<Uuid>,

    pub machine: StageMachine,

    pub log: RunLog,

    pub artifacts: RunArtifacts,

    pub is_running: bool,

    /// Message of the fatal error that ended the run
    pub error: Option<String>,

    pub elapsed_seconds: u64,
}

impl RunSession {
    /// Prepare the session for a new run
    pub fn begin(&mut self, run_id: Uuid) {
        self.run_id = Some(run_id);
        self.machine.reset();
        self.log.clear();
        self.artifacts = RunArtifacts::default();
        self.is_running = true;
        self.error = None;
        self.elapsed_seconds = 0;
    }

    /// Whether `run_id` still owns this session
    pub fn is_current(&self, run_id: Uuid) -> bool {
        self.run_id == Some(run_id)
    }

    pub fn stage(&self) -> Stage {
        self.machine.current()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            run_id: self.run_id,
            stage: self.machine.current(),
            logs: self.log.entries().to_vec(),
            counters: self.log.counters(),
            artifacts: self.artifacts.clone(),
            is_running: self.is_running,
            error: self.error.clone(),
            elapsed_seconds: self.elapsed_seconds,
            progress: self.machine.progress(),
            has_scorecard: self.artifacts.has_scorecard(),
        }
    }
}

/// Point-in-time copy of a session, including derived values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: Option<Uuid>,
    pub stage: Stage,
    pub logs: Vec<LogEntry>,
    pub counters: Counters,
    pub artifacts: RunArtifacts,
    pub is_running: bool,
    pub error: Option<String>,
    pub elapsed_seconds: u64,

    /// Normalized stage position in `0.0..=1.0`
    pub progress: f64,

    pub has_scorecard: bool,
}

impl RunSnapshot {
    /// Stages in order of their first log entry
    pub fn logged_stages(&self) -> Vec<Stage> {
        let mut stages: Vec<Stage> = Vec::new();
        for entry in &self.logs {
            if !stages.contains(&entry.stage) {
                stages.push(entry.stage);
            }
        }
        stages
    }

    /// Log entries recorded while `stage` was current
    pub fn logs_for(&self, stage: Stage) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter().filter(move |e| e.stage == stage)
    }
}
