//! Run log entries and counters.
//!
//! The log is append-only within a run: entries are never edited or
//! removed until the next run clears the whole accumulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// Severity of a run log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single timestamped line in the run log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique identifier for this entry
    pub id: Uuid,

    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,

    /// Stage that was current when the entry was recorded
    pub stage: Stage,

    /// Human-readable message
    pub message: String,

    pub level: LogLevel,

    /// Optional structured payload (scores, identifiers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl LogEntry {
    /// Create an entry stamped with a fresh id and the current time
    pub fn new(stage: Stage, message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            stage,
            message: message.into(),
            level,
            data: None,
        }
    }

    /// Attach a structured payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Counter fields tracked during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterField {
    Requests,
    Blocks,
    Incidents,
    PendingReviews,
    DriftAlerts,
    Evaluations,
}

/// Run-scoped counters. Every field only grows until the next run starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    /// Synthetic requests sent through the gateway
    pub requests: u64,

    /// Requests the gateway blocked
    pub blocks: u64,

    pub incidents: u64,

    /// Items waiting in the human review queue
    pub pending_reviews: u64,

    pub drift_alerts: u64,

    pub evaluations: u64,
}

impl Counters {
    pub fn increment(&mut self, field: CounterField, amount: u64) {
        let slot = match field {
            CounterField::Requests => &mut self.requests,
            CounterField::Blocks => &mut self.blocks,
            CounterField::Incidents => &mut self.incidents,
            CounterField::PendingReviews => &mut self.pending_reviews,
            CounterField::DriftAlerts => &mut self.drift_alerts,
            CounterField::Evaluations => &mut self.evaluations,
        };
        *slot += amount;
    }
}

/// Append-only log plus counters for a single run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunLog {
    entries: Vec<LogEntry>,
    counters: Counters,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message and return the created entry
    pub fn add_log(
        &mut self,
        stage: Stage,
        message: impl Into<String>,
        level: LogLevel,
        data: Option<serde_json::Value>,
    ) -> &LogEntry {
        let entry = LogEntry::new(stage, message, level);
        self.entries.push(match data {
            Some(data) => entry.with_data(data),
            None => entry,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn increment(&mut self, field: CounterField, amount: u64) {
        self.counters.increment(field, amount);
    }

    /// Empty the log and zero every counter
    pub fn clear(&mut self) {
        self.entries.clear();
        self.counters = Counters::default();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
