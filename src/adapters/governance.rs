//! Typed facade over the governance backend's operations.
//!
//! Each operation's payload is decoded into its own struct here, so the
//! orchestrator never reaches into untyped JSON.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::domain::EvaluationKind;

use super::{RemoteError, RemoteOperations};

pub const OP_PREFLIGHT: &str = "governance-preflight";
pub const OP_RUN_EVALUATION: &str = "run-evaluation";
pub const OP_GENERATE_TRAFFIC: &str = "generate-traffic";
pub const OP_DETECT_DRIFT: &str = "detect-drift";
pub const OP_CREATE_INCIDENT: &str = "create-incident";
pub const OP_ESCALATE_REVIEW: &str = "escalate-review";
pub const OP_RUN_REDTEAM: &str = "run-redteam";
pub const OP_GENERATE_SCORECARD: &str = "generate-scorecard";

/// Result of `governance-preflight`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightReport {
    pub model_name: String,
    #[serde(default)]
    pub system_name: Option<String>,
    /// Whether the model is registered and reachable
    pub ready: bool,
}

/// Result of `run-evaluation`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    #[serde(alias = "id")]
    pub run_id: String,
    pub overall_score: f64,
}

/// Result of one `generate-traffic` request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficOutcome {
    pub blocked: bool,
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

/// Result of `detect-drift`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub alerts_created: u64,
}

/// Result of `create-incident`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReceipt {
    #[serde(alias = "id")]
    pub incident_id: String,
}

/// Result of `escalate-review`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEscalation {
    pub items_created: u64,
}

/// Result of `run-redteam`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedTeamCampaign {
    #[serde(alias = "id")]
    pub campaign_id: String,
    #[serde(default)]
    pub findings: Option<u64>,
}

/// Result of `generate-scorecard` with `format: "html"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrintableScorecard {
    pub html: String,
}

/// Incident to open for the run
#[derive(Debug, Clone)]
pub struct NewIncident<'a> {
    pub title: &'a str,
    pub severity: &'a str,
    pub description: &'a str,
}

/// Typed calls against a [`RemoteOperations`] backend for one subject model
pub struct GovernanceApi<'a> {
    backend: &'a dyn RemoteOperations,
    model_id: &'a str,
    system_id: &'a str,
    cancel: &'a CancellationToken,
}

impl<'a> GovernanceApi<'a> {
    pub fn new(
        backend: &'a dyn RemoteOperations,
        model_id: &'a str,
        system_id: &'a str,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            backend,
            model_id,
            system_id,
            cancel,
        }
    }

    async fn call<T: DeserializeOwned>(&self, operation: &str, args: Value) -> Result<T, RemoteError> {
        let payload = self.backend.invoke(operation, args, self.cancel).await?;
        decode(operation, payload)
    }

    pub async fn preflight(&self) -> Result<PreflightReport, RemoteError> {
        self.call(
            OP_PREFLIGHT,
            json!({ "modelId": self.model_id, "systemId": self.system_id }),
        )
        .await
    }

    pub async fn run_evaluation(&self, kind: EvaluationKind) -> Result<EvaluationResult, RemoteError> {
        self.call(
            OP_RUN_EVALUATION,
            json!({
                "modelId": self.model_id,
                "systemId": self.system_id,
                "evaluationType": kind.as_str(),
            }),
        )
        .await
    }

    pub async fn generate_traffic(&self, sequence: u32) -> Result<TrafficOutcome, RemoteError> {
        self.call(
            OP_GENERATE_TRAFFIC,
            json!({
                "modelId": self.model_id,
                "systemId": self.system_id,
                "sequence": sequence,
            }),
        )
        .await
    }

    pub async fn detect_drift(&self) -> Result<DriftReport, RemoteError> {
        self.call(OP_DETECT_DRIFT, json!({ "modelId": self.model_id }))
            .await
    }

    pub async fn create_incident(&self, incident: NewIncident<'_>) -> Result<IncidentReceipt, RemoteError> {
        self.call(
            OP_CREATE_INCIDENT,
            json!({
                "modelId": self.model_id,
                "systemId": self.system_id,
                "title": incident.title,
                "severity": incident.severity,
                "description": incident.description,
            }),
        )
        .await
    }

    pub async fn escalate_review(
        &self,
        incident_id: Option<&str>,
        reason: &str,
    ) -> Result<ReviewEscalation, RemoteError> {
        self.call(
            OP_ESCALATE_REVIEW,
            json!({
                "modelId": self.model_id,
                "incidentId": incident_id,
                "reason": reason,
            }),
        )
        .await
    }

    pub async fn run_red_team(&self, attack_types: &[String]) -> Result<RedTeamCampaign, RemoteError> {
        self.call(
            OP_RUN_REDTEAM,
            json!({ "modelId": self.model_id, "attackTypes": attack_types }),
        )
        .await
    }

    /// Structured scorecard. The payload is kept as-is.
    pub async fn scorecard(&self) -> Result<Value, RemoteError> {
        let payload = self
            .backend
            .invoke(OP_GENERATE_SCORECARD, self.scorecard_args("json"), self.cancel)
            .await?;
        if !payload.is_object() {
            return Err(RemoteError::Decode {
                operation: OP_GENERATE_SCORECARD.to_string(),
                message: "expected a JSON object".to_string(),
            });
        }
        Ok(payload)
    }

    pub async fn printable_scorecard(&self) -> Result<PrintableScorecard, RemoteError> {
        self.call(OP_GENERATE_SCORECARD, self.scorecard_args("html"))
            .await
    }

    fn scorecard_args(&self, format: &str) -> Value {
        json!({
            "modelId": self.model_id,
            "systemId": self.system_id,
            "format": format,
        })
    }
}

/// Decode an operation payload into its typed result
pub fn decode<T: DeserializeOwned>(operation: &str, payload: Value) -> Result<T, RemoteError> {
    serde_json::from_value(payload).map_err(|e| RemoteError::Decode {
        operation: operation.to_string(),
        message: e.to_string(),
    })
}
