//! Error handling for bulk orchestration
//!
//! This module defines all error types used throughout the crate.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for bulk operations
pub type Result<T> = std::result::Result<T, BulkError>;

/// Main error type for bulk orchestration
#[derive(Error, Debug)]
pub enum BulkError {
    /// Credential exchange rejected, or the session was refused later on
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Job or batch creation refused by the remote service
    #[error("Remote service rejected the request ({code}): {message}")]
    RemoteRejected { code: String, message: String },

    /// Result fetch attempted before the batch reached a terminal state
    #[error("Batch {batch_id} is in state {state}, results are not available yet")]
    InvalidState { batch_id: String, state: String },

    /// Recoverable failure while querying the remote service
    #[error("Transient query failure: {0}")]
    TransientQueryFailure(String),

    /// The remote service does not know the batch (or its job)
    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    /// Result set does not line up with the submitted records
    #[error("Batch {batch_id} returned {actual} results for {expected} records")]
    ResultCountMismatch {
        batch_id: String,
        expected: usize,
        actual: usize,
    },

    /// The run was cancelled through its cancellation token
    #[error("Operation cancelled")]
    Cancelled,

    /// Polling exceeded its configured deadline
    #[error("Polling deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Response bodies that could not be interpreted
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BulkError {
    /// Build a `RemoteRejected` error
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the same call later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            BulkError::TransientQueryFailure(_) => true,
            BulkError::HttpClient(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            _ => false,
        }
    }

    /// Whether the error is a remote refusal that will not go away on retry
    pub fn is_permanent(&self) -> bool {
        !self.is_transient() && !matches!(self, BulkError::Cancelled)
    }

    /// Check if this is an authentication error
    pub fn is_auth_error(&self) -> bool {
        matches!(self, BulkError::AuthenticationFailed(_))
    }
}

/// Render an error and every nested `source()` one message per line
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}
