//! HTTP adapter for the backend's serverless functions.
//!
//! Each operation is a function endpoint: `POST {base_url}/functions/v1/{name}`
//! with the JSON arguments as the body. A cancelled run sends no new
//! requests, but a request already on the wire is allowed to finish so that
//! side effects the server committed are not lost.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{RemoteError, RemoteOperations};

/// Serverless function client
pub struct FunctionsClient {
    /// Project base URL (no trailing slash)
    base_url: String,
    /// Key sent as bearer token and `apikey` header
    api_key: Option<String>,
    /// Per-request timeout
    timeout: Duration,
    /// HTTP client
    client: reqwest::Client,
}

impl FunctionsClient {
    /// Create a new client for `base_url`
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Build the URL of a function endpoint
    fn function_url(&self, operation: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, operation)
    }

    async fn send(&self, operation: &str, args: &Value) -> Result<Value, RemoteError> {
        let mut request = self
            .client
            .post(self.function_url(operation))
            .timeout(self.timeout)
            .json(args);

        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key).header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::transport(describe_transport_error(operation, &e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::transport(describe_transport_error(operation, &e)))?;

        debug!(operation, status = status.as_u16(), "Function responded");

        let payload = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::String(body))
        };

        classify_response(status, payload)
    }
}

#[async_trait]
impl RemoteOperations for FunctionsClient {
    fn name(&self) -> &str {
        "functions"
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
        self.send(operation, &args).await
    }
}

fn describe_transport_error(operation: &str, error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Function '{}' timed out", operation)
    } else if error.is_connect() {
        format!("Could not reach backend for '{}': {}", operation, error)
    } else {
        error.to_string()
    }
}

/// Map an HTTP status and body onto an operation result.
///
/// A 2xx body carrying an `error` field is still a failure.
pub fn classify_response(status: StatusCode, payload: Value) -> Result<Value, RemoteError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(RemoteError::forbidden(
            error_message(&payload).unwrap_or_else(|| status.to_string()),
        ));
    }

    if !status.is_success() {
        return Err(RemoteError::rejected(
            error_message(&payload).unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        ));
    }

    if let Some(message) = payload.get("error").and_then(error_text) {
        return Err(RemoteError::rejected(message));
    }

    Ok(payload)
}

fn error_message(payload: &Value) -> Option<String> {
    match payload {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Object(map) => map
            .get("error")
            .and_then(error_text)
            .or_else(|| map.get("message").and_then(error_text)),
        _ => None,
    }
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map.get("message").and_then(Value::as_str).map(str::to_string),
        Value::Null | Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
