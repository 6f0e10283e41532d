//! Events broadcast by the orchestrator while a run progresses.
//!
//! Presentation layers subscribe to these instead of the orchestrator
//! calling into them directly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::log::LogEntry;
use super::stage::Stage;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunOutcome {
    /// Every stage was entered
    Completed,

    /// The user stopped the run
    Cancelled,

    /// A fatal error ended the run
    Failed { error: String },
}

/// Stage event emitted on the orchestrator's broadcast channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum RunEvent {
    /// A new run started
    RunStarted { run_id: Uuid },

    /// The state machine entered a stage
    StageEntered { run_id: Uuid, stage: Stage },

    /// A log entry was recorded
    Log { run_id: Uuid, entry: LogEntry },

    /// Tour mode: show the view for this stage
    Navigate {
        run_id: Uuid,
        stage: Stage,
        path: String,
    },

    /// The run ended
    RunFinished { run_id: Uuid, outcome: RunOutcome },
}

impl RunEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            RunEvent::RunStarted { run_id }
            | RunEvent::StageEntered { run_id, .. }
            | RunEvent::Log { run_id, .. }
            | RunEvent::Navigate { run_id, .. }
            | RunEvent::RunFinished { run_id, .. } => *run_id,
        }
    }
}
