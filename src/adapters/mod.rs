//! Adapter interfaces for the governance backend.
//!
//! Every stage of a demo run talks to the backend through
//! [`RemoteOperations`]: call a named operation with JSON arguments, get a
//! JSON payload back or a classified [`RemoteError`].

pub mod functions;
pub mod governance;
pub mod scripted;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use functions::FunctionsClient;
pub use governance::{
    DriftReport, EvaluationResult, GovernanceApi, IncidentReceipt, NewIncident, PreflightReport,
    PrintableScorecard, RedTeamCampaign, ReviewEscalation, TrafficOutcome,
};
pub use scripted::{RecordedCall, ScriptedBackend};

/// Failure of a remote operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The operation ran and reported a failure
    #[error("{message}")]
    Rejected { message: String },

    /// The caller is not allowed to run the operation
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// The payload did not have the shape the operation promises
    #[error("unexpected response from '{operation}': {message}")]
    Decode { operation: String, message: String },

    /// The request never produced a response (network, timeout)
    #[error("{0}")]
    Transport(String),

    /// The run was cancelled before the call was sent
    #[error("cancelled")]
    Cancelled,
}

impl RemoteError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Errors that end the whole run instead of a single stage
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether the operation was refused for lack of permission.
    ///
    /// `Forbidden` is the contract. Backends that only report a message are
    /// matched on its text, which breaks as soon as the wording changes.
    pub fn is_authorization_denied(&self) -> bool {
        match self {
            Self::Forbidden { .. } => true,
            Self::Rejected { message } => {
                let message = message.to_lowercase();
                ["unauthorized", "403", "forbidden", "admin"]
                    .iter()
                    .any(|needle| message.contains(needle))
            }
            _ => false,
        }
    }
}

/// Trait for backends that execute named operations
#[async_trait]
pub trait RemoteOperations: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Invoke `operation` with `args`.
    ///
    /// Implementations should return [`RemoteError::Cancelled`] if `cancel`
    /// fires before a response arrives.
    async fn invoke(
        &self,
        operation: &str,
        args: Value,
        cancel: &CancellationToken,
    ) -> Result<Value, RemoteError>;
}
