//! In-process simulated backend.
//!
//! Answers every demo operation with deterministic payloads, so a run can be
//! rehearsed without a live project. Responses can be overridden per
//! operation and every call is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::governance::{
    OP_CREATE_INCIDENT, OP_DETECT_DRIFT, OP_ESCALATE_REVIEW, OP_GENERATE_SCORECARD,
    OP_GENERATE_TRAFFIC, OP_PREFLIGHT, OP_RUN_EVALUATION, OP_RUN_REDTEAM,
};
use super::{RemoteError, RemoteOperations};

/// A call received by the scripted backend
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: String,
    pub args: Value,
}

#[derive(Default)]
struct Script {
    /// One-shot responses, consumed before anything else
    queued: HashMap<String, VecDeque<Result<Value, RemoteError>>>,
    /// Responses returned on every call
    fixed: HashMap<String, Result<Value, RemoteError>>,
    calls: Vec<RecordedCall>,
}

/// Simulated governance backend
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    latency: Duration,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every call to `operation` with `payload`
    pub fn respond(&self, operation: &str, payload: Value) -> &Self {
        self.script().fixed.insert(operation.to_string(), Ok(payload));
        self
    }

    /// Fail every call to `operation` with `error`
    pub fn fail(&self, operation: &str, error: RemoteError) -> &Self {
        self.script().fixed.insert(operation.to_string(), Err(error));
        self
    }

    /// Queue a one-shot result for the next call to `operation`
    pub fn push(&self, operation: &str, result: Result<Value, RemoteError>) -> &Self {
        self.script()
            .queued
            .entry(operation.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }

    /// Number of calls received for `operation`
    pub fn call_count(&self, operation: &str) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    fn next_result(&self, operation: &str, args: &Value) -> Result<Value, RemoteError> {
        let mut script = self.script();
        script.calls.push(RecordedCall {
            operation: operation.to_string(),
            args: args.clone(),
        });
        let call_number = script
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count();

        if let Some(result) = script.queued.get_mut(operation).and_then(VecDeque::pop_front) {
            return result;
        }
        if let Some(result) = script.fixed.get(operation) {
            return result.clone();
        }
        default_response(operation, args, call_number)
    }
}

#[async_trait]
impl RemoteOperations for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        operation: &str,
        args: Value,
        cancel: &CancellationToken,
    ) -> Result<Value, RemoteError> {
        if cancel.is_cancelled() {
            return Err(RemoteError::Cancelled);
        }

        // Like a live call, an accepted request completes even if cancelled
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.next_result(operation, &args)
    }
}

/// Canned payload for `operation`. `call_number` is 1-based per operation.
fn default_response(operation: &str, args: &Value, call_number: usize) -> Result<Value, RemoteError> {
    let model_id = args.get("modelId").and_then(Value::as_str).unwrap_or("model");

    match operation {
        OP_PREFLIGHT => Ok(json!({
            "modelName": format!("{} (simulated)", model_id),
            "systemName": args.get("systemId").and_then(Value::as_str),
            "ready": true,
        })),
        OP_RUN_EVALUATION => {
            let kind = args
                .get("evaluationType")
                .and_then(Value::as_str)
                .unwrap_or("general");
            let score = match kind {
                "fairness" => 82.0,
                "toxicity" => 91.0,
                "jailbreak" => 64.0,
                "hallucination" => 77.0,
                "privacy" => 88.0,
                _ => 70.0,
            };
            Ok(json!({
                "runId": format!("eval-{}-{}", kind, call_number),
                "overallScore": score,
            }))
        }
        OP_GENERATE_TRAFFIC => {
            let sequence = args.get("sequence").and_then(Value::as_u64).unwrap_or(0);
            Ok(json!({
                "blocked": sequence % 5 == 4,
                "latencyMs": 120 + (sequence % 7) * 15,
            }))
        }
        OP_DETECT_DRIFT => Ok(json!({ "alertsCreated": 2 })),
        OP_CREATE_INCIDENT => Ok(json!({ "incidentId": format!("inc-{}", call_number) })),
        OP_ESCALATE_REVIEW => Ok(json!({ "itemsCreated": 1 })),
        OP_RUN_REDTEAM => Ok(json!({
            "campaignId": format!("rt-{}", call_number),
            "findings": 3,
        })),
        OP_GENERATE_SCORECARD => match args.get("format").and_then(Value::as_str) {
            Some("html") => Ok(json!({
                "html": format!(
                    "<html><head><title>Scorecard: {0}</title></head>\
                     <body><h1>Governance scorecard</h1><p>Model: {0}</p></body></html>",
                    model_id
                ),
            })),
            _ => Ok(json!({
                "modelId": model_id,
                "grade": "B",
                "overallScore": 80.4,
                "sections": ["evaluations", "monitoring", "incidents", "red-team"],
            })),
        },
        other => Err(RemoteError::rejected(format!("Unknown operation '{}'", other))),
    }
}
