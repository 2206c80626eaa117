//! Error types for the accounts agent

use thiserror::Error;

use crate::models::AgentKind;

/// Result type alias for agent and orchestrator operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Failures of the AI-completion boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion request timed out")]
    Timeout,

    #[error("completion service rate limited the request")]
    RateLimited,

    #[error("completion service rejected the credentials: {0}")]
    AuthError(String),

    #[error("completion service failed: {0}")]
    TransientError(String),
}

impl CompletionError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CompletionError::AuthError(_))
    }
}

/// Failures of the accounting-data boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger resource not found: {0}")]
    NotFound(String),

    #[error("ledger rejected the credentials: {0}")]
    AuthError(String),

    #[error("invalid ledger filter: {0}")]
    InvalidFilter(String),

    #[error("ledger request failed: {0}")]
    TransientError(String),
}

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Core Pipeline Errors
    // =============================

    #[error("Agent invocation failed: {0}")]
    Invocation(String),

    #[error("Agent already registered: {0}")]
    DuplicateAgent(AgentKind),

    #[error("Missing required configuration: {}", .0.join(", "))]
    ConfigurationMissing(Vec<&'static str>),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // =============================
    // External Service Errors
    // =============================

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
