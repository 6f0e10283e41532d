//! Demo stages and the forward-only state machine that sequences them.
//!
//! The stage order is fixed. A run walks it one stage at a time from
//! `Preflight` to `Complete`; the only way off that path is `Error`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One named step of the governance demo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// No run has started (or the orchestrator was reset)
    Idle,

    /// Verify the model and system exist and are reachable
    Preflight,

    EvalFairness,
    EvalToxicity,
    EvalJailbreak,
    EvalHallucination,
    EvalPrivacy,

    /// Replay synthetic traffic through the gateway
    TrafficGeneration,

    /// Ask the monitor for drift alerts
    DriftDetection,

    /// Open an incident for what the run observed
    IncidentCreation,

    /// Route the incident to the human review queue
    HitlEscalation,

    /// Launch an adversarial campaign
    RedTeam,

    /// Build the scorecard in both representations
    ScorecardGeneration,

    /// Terminal: every stage was entered
    Complete,

    /// Terminal: a fatal error ended the run
    Error,
}

impl Stage {
    /// The fixed stage order of a run, from the first stage to `Complete`.
    ///
    /// `Idle` and `Error` are not part of the sequence.
    pub const SEQUENCE: [Stage; 13] = [
        Stage::Preflight,
        Stage::EvalFairness,
        Stage::EvalToxicity,
        Stage::EvalJailbreak,
        Stage::EvalHallucination,
        Stage::EvalPrivacy,
        Stage::TrafficGeneration,
        Stage::DriftDetection,
        Stage::IncidentCreation,
        Stage::HitlEscalation,
        Stage::RedTeam,
        Stage::ScorecardGeneration,
        Stage::Complete,
    ];

    /// Stable identifier used in logs and serialized output
    pub fn slug(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Preflight => "preflight",
            Stage::EvalFairness => "eval-fairness",
            Stage::EvalToxicity => "eval-toxicity",
            Stage::EvalJailbreak => "eval-jailbreak",
            Stage::EvalHallucination => "eval-hallucination",
            Stage::EvalPrivacy => "eval-privacy",
            Stage::TrafficGeneration => "traffic-generation",
            Stage::DriftDetection => "drift-detection",
            Stage::IncidentCreation => "incident-creation",
            Stage::HitlEscalation => "hitl-escalation",
            Stage::RedTeam => "red-team",
            Stage::ScorecardGeneration => "scorecard-generation",
            Stage::Complete => "complete",
            Stage::Error => "error",
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Stage::Idle => "Ready",
            Stage::Preflight => "Preflight checks",
            Stage::EvalFairness => "Fairness evaluation",
            Stage::EvalToxicity => "Toxicity evaluation",
            Stage::EvalJailbreak => "Jailbreak resistance evaluation",
            Stage::EvalHallucination => "Hallucination evaluation",
            Stage::EvalPrivacy => "Privacy evaluation",
            Stage::TrafficGeneration => "Generating production traffic",
            Stage::DriftDetection => "Detecting drift",
            Stage::IncidentCreation => "Creating incident",
            Stage::HitlEscalation => "Escalating to human review",
            Stage::RedTeam => "Red-team campaign",
            Stage::ScorecardGeneration => "Generating scorecard",
            Stage::Complete => "Demo complete",
            Stage::Error => "Demo failed",
        }
    }

    /// View the surrounding application shows while this stage runs in tour mode
    pub fn tour_path(self) -> Option<&'static str> {
        match self {
            Stage::Preflight => Some("/models"),
            Stage::EvalFairness
            | Stage::EvalToxicity
            | Stage::EvalJailbreak
            | Stage::EvalHallucination
            | Stage::EvalPrivacy => Some("/evaluations"),
            Stage::TrafficGeneration => Some("/observability"),
            Stage::DriftDetection => Some("/alerts"),
            Stage::IncidentCreation => Some("/incidents"),
            Stage::HitlEscalation => Some("/hitl"),
            Stage::RedTeam => Some("/red-team"),
            Stage::ScorecardGeneration | Stage::Complete => Some("/scorecards"),
            Stage::Idle | Stage::Error => None,
        }
    }

    /// Evaluation suite run by this stage, if it is an evaluation stage
    pub fn evaluation_kind(self) -> Option<EvaluationKind> {
        match self {
            Stage::EvalFairness => Some(EvaluationKind::Fairness),
            Stage::EvalToxicity => Some(EvaluationKind::Toxicity),
            Stage::EvalJailbreak => Some(EvaluationKind::Jailbreak),
            Stage::EvalHallucination => Some(EvaluationKind::Hallucination),
            Stage::EvalPrivacy => Some(EvaluationKind::Privacy),
            _ => None,
        }
    }

    /// Position in [`Stage::SEQUENCE`]
    pub fn position(self) -> Option<usize> {
        Self::SEQUENCE.iter().position(|s| *s == self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Error)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Evaluation suites run against the subject model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Fairness,
    Toxicity,
    Jailbreak,
    Hallucination,
    Privacy,
}

impl EvaluationKind {
    /// Name sent to the evaluation operation
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluationKind::Fairness => "fairness",
            EvaluationKind::Toxicity => "toxicity",
            EvaluationKind::Jailbreak => "jailbreak",
            EvaluationKind::Hallucination => "hallucination",
            EvaluationKind::Privacy => "privacy",
        }
    }
}

/// Forward-only cursor over [`Stage::SEQUENCE`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageMachine {
    current: Stage,

    /// Furthest position reached in the sequence (for progress after `Error`)
    reached: Option<usize>,
}

impl StageMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    /// Move to the next stage of the sequence.
    ///
    /// Returns the stage entered, or `None` when the machine is already in a
    /// terminal stage.
    pub fn advance(&mut self) -> Option<Stage> {
        let next = match self.current {
            Stage::Idle => 0,
            stage if stage.is_terminal() => return None,
            stage => stage.position()? + 1,
        };

        let stage = *Stage::SEQUENCE.get(next)?;
        self.current = stage;
        self.reached = Some(next);
        Some(stage)
    }

    /// Jump to the terminal `Error` stage
    pub fn fail(&mut self) {
        self.current = Stage::Error;
    }

    /// Back to `Idle`
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Normalized position of the run in `0.0..=1.0`.
    ///
    /// `Idle` reports 0. `Error` keeps the position of the last stage reached.
    pub fn progress(&self) -> f64 {
        let position = match self.current {
            Stage::Idle => return 0.0,
            Stage::Error => match self.reached {
                Some(position) => position,
                None => return 0.0,
            },
            stage => {
                let position = stage.position();
                debug_assert!(position.is_some(), "stage {stage} is not in the sequence");
                position.unwrap_or(0)
            }
        };

        position as f64 / (Stage::SEQUENCE.len() - 1) as f64
    }
}
