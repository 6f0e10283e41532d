//! govrun - Governance demo orchestrator
//!
//! Drives the end-to-end demo of an AI governance platform: preflight,
//! five model evaluations, synthetic traffic, drift detection, incident
//! creation, human review escalation, a red-team campaign and a scorecard,
//! each stage a call against the platform's backend.
//!
//! # Architecture
//!
//! The run is a forward-only state machine:
//! - Stages execute strictly in order, one remote call (or batch) at a time
//! - A failed stage is logged and the run moves on; only transport failures
//!   end the run
//! - Progress is observed through session snapshots and broadcast events
//!
//! # Modules
//!
//! - `adapters`: Backend integrations (serverless functions, simulated backend)
//! - `core`: Orchestration logic (Orchestrator, ActivityFeed, Export)
//! - `domain`: Data structures (Stage, LogEntry, Artifacts, Session)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Rehearse against the simulated backend
//! govrun run --model credit-scorer --system lending --simulate
//!
//! # Run against a live project, navigating the UI stage by stage
//! GOVRUN_BACKEND_URL=https://project.example.co govrun run \
//!     --model credit-scorer --system lending --tour
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{FunctionsClient, RemoteError, RemoteOperations, ScriptedBackend};
pub use core::{ActivityFeed, DemoOrchestrator, DisplayMode, RunOptions};
pub use domain::{LogEntry, LogLevel, RunEvent, RunOutcome, RunSnapshot, Stage};
