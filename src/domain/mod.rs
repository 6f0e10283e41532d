//! Domain types for the governance demo orchestrator.
//!
//! This module contains the core data structures:
//! - Stage: The fixed stage order and its state machine
//! - Log: Run log entries and counters
//! - Artifact: Identifiers and payloads collected by stages
//! - Session: Mutable run state and read-only snapshots
//! - Events: Messages broadcast to presentation layers

pub mod artifact;
pub mod events;
pub mod log;
pub mod session;
pub mod stage;

// Re-export commonly used types
pub use artifact::RunArtifacts;
pub use events::{RunEvent, RunOutcome};
pub use log::{CounterField, Counters, LogEntry, LogLevel, RunLog};
pub use session::{RunSession, RunSnapshot};
pub use stage::{EvaluationKind, Stage, StageMachine};
