//! Artifacts collected while a demo run progresses.
//!
//! Each stage adds to the record; nothing is removed until the next run.

use serde::{Deserialize, Serialize};

/// Identifiers and payloads produced by the stages of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunArtifacts {
    /// Evaluation run ids, in stage order
    pub evaluation_ids: Vec<String>,

    /// Successful synthetic requests
    pub traffic_count: u64,

    pub drift_alert_count: u64,

    pub incident_ids: Vec<String>,

    /// Review items created by the escalation stage
    pub hitl_item_count: u64,

    pub red_team_campaign_id: Option<String>,

    /// Structured scorecard
    pub scorecard: Option<serde_json::Value>,

    /// Printable scorecard (HTML)
    pub scorecard_html: Option<String>,
}

impl RunArtifacts {
    /// True once either scorecard representation has been produced
    pub fn has_scorecard(&self) -> bool {
        self.scorecard.is_some() || self.scorecard_html.is_some()
    }

    /// Most recent incident, used as the subject of the review escalation
    pub fn latest_incident(&self) -> Option<&str> {
        self.incident_ids.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
