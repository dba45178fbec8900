//! Domain errors for the agent orchestration core.

use thiserror::Error;

/// Domain-level errors that can occur while orchestrating agents.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("no agents enabled for this user")]
    NoAgentsEnabled,

    #[error("no dataset loaded for session {0}")]
    DatasetMissing(String),

    #[error("unknown agent '{name}'; available agents: {available:?}")]
    UnknownAgent { name: String, available: Vec<String> },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("deep analysis report not found: {0}")]
    ReportNotFound(uuid::Uuid),

    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("upstream language model error: {0}")]
    UpstreamLm(String),

    #[error("retriever failed: {0}")]
    RetrieverFailed(String),

    #[error("request timed out after {0}s; try simplifying your query")]
    Timeout(u64),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl DomainError {
    /// Whether this error kind should be contained per-agent rather than
    /// aborting the remainder of a plan (spec §7: upstream/timeout errors
    /// are agent-level; configuration/input/internal errors surface).
    pub fn is_agent_contained(&self) -> bool {
        matches!(
            self,
            DomainError::UpstreamLm(_) | DomainError::RetrieverFailed(_) | DomainError::Timeout(_)
        )
    }
}
