//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: Stage sequencing, run controls and session state
//! - Activity: Process-wide bounded activity feed
//! - Export: Scorecard download and printable-view sinks

pub mod activity;
pub mod export;
pub mod orchestrator;

// Re-export commonly used types
pub use activity::{ActivityEntry, ActivityFeed, Subscription};
pub use export::{ExportError, ExportSink, FileExportSink};
pub use orchestrator::{DemoOrchestrator, DisplayMode, RunOptions};
