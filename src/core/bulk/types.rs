//! Job and batch data structures

use super::result::BatchResult;
use crate::utils::error::{BulkError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Bulk operation declared by a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Insert,
    Update,
    Upsert,
    Delete,
    HardDelete,
    Query,
    QueryAll,
}

impl OperationKind {
    /// Wire token for this operation
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::Update => "update",
            OperationKind::Upsert => "upsert",
            OperationKind::Delete => "delete",
            OperationKind::HardDelete => "hardDelete",
            OperationKind::Query => "query",
            OperationKind::QueryAll => "queryAll",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OperationKind {
    type Err = BulkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "insert" => Ok(OperationKind::Insert),
            "update" => Ok(OperationKind::Update),
            "upsert" => Ok(OperationKind::Upsert),
            "delete" => Ok(OperationKind::Delete),
            "harddelete" => Ok(OperationKind::HardDelete),
            "query" => Ok(OperationKind::Query),
            "queryall" => Ok(OperationKind::QueryAll),
            other => Err(BulkError::Config(format!("Unknown operation: {}", other))),
        }
    }
}

/// What to create a job for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Target entity type, e.g. `Account`
    pub entity_type: String,
    /// Declared operation
    pub operation: OperationKind,
    /// External id field, required for upserts
    pub external_id_field: Option<String>,
}

impl JobSpec {
    /// Create a job spec
    pub fn new(entity_type: impl Into<String>, operation: OperationKind) -> Self {
        Self {
            entity_type: entity_type.into(),
            operation,
            external_id_field: None,
        }
    }

    /// Set the external id field
    pub fn with_external_id_field(mut self, field: impl Into<String>) -> Self {
        self.external_id_field = Some(field.into());
        self
    }

    /// Local sanity checks done before any network call
    pub fn validate(&self) -> Result<()> {
        if self.entity_type.trim().is_empty() {
            return Err(BulkError::Config("Entity type cannot be empty".to_string()));
        }
        if self.operation == OperationKind::Upsert && self.external_id_field.is_none() {
            return Err(BulkError::Config(
                "Upsert jobs require an external id field".to_string(),
            ));
        }
        Ok(())
    }
}

/// Job state as reported by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Open,
    Closed,
    Aborted,
    Failed,
}

/// A declared bulk operation; immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    id: String,
    entity_type: String,
    operation: OperationKind,
    created_at: DateTime<Utc>,
}

impl Job {
    pub(crate) fn new(id: String, entity_type: String, operation: OperationKind) -> Self {
        Self {
            id,
            entity_type,
            operation,
            created_at: Utc::now(),
        }
    }

    /// Remote job id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target entity type
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Declared operation
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// When the job was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Batch lifecycle state
///
/// `Queued -> InProgress -> {Completed | Failed | NotProcessed}`. The last
/// three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchState {
    Queued,
    InProgress,
    Completed,
    Failed,
    #[serde(rename = "Not Processed", alias = "NotProcessed")]
    NotProcessed,
}

impl BatchState {
    /// Whether no further transition can occur
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::Completed | BatchState::Failed | BatchState::NotProcessed
        )
    }

    /// Whether moving to `next` keeps the lifecycle monotonic
    pub fn can_transition_to(&self, next: BatchState) -> bool {
        match self {
            BatchState::Queued => next != BatchState::Queued,
            BatchState::InProgress => next.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BatchState::Queued => "Queued",
            BatchState::InProgress => "InProgress",
            BatchState::Completed => "Completed",
            BatchState::Failed => "Failed",
            BatchState::NotProcessed => "Not Processed",
        };
        f.write_str(name)
    }
}

/// One chunk of records submitted under a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    id: String,
    job_id: String,
    state: BatchState,
    state_message: Option<String>,
    record_count: usize,
    submitted_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<BatchResult>,
}

impl Batch {
    /// Track a batch the remote service just accepted
    pub fn new(
        id: impl Into<String>,
        job_id: impl Into<String>,
        state: BatchState,
        record_count: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            job_id: job_id.into(),
            state,
            state_message: None,
            record_count,
            submitted_at: now,
            completed_at: state.is_terminal().then_some(now),
            result: None,
        }
    }

    pub(crate) fn with_state_message(mut self, message: Option<String>) -> Self {
        self.state_message = message;
        self
    }

    /// Remote batch id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning job id
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Last observed state
    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Message attached to the last state change, if any
    pub fn state_message(&self) -> Option<&str> {
        self.state_message.as_deref()
    }

    /// Number of records submitted in this batch
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Whether the batch reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// When the batch was submitted
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// When a terminal state was first observed
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Result set, once fetched
    pub fn result(&self) -> Option<&BatchResult> {
        self.result.as_ref()
    }

    /// Record a freshly reported state
    ///
    /// Returns `true` when the state changed. Reports that would move the
    /// batch backwards, or out of a terminal state, are ignored.
    pub fn observe(&mut self, state: BatchState, message: Option<String>) -> bool {
        if self.state == state {
            return false;
        }

        if !self.state.can_transition_to(state) {
            warn!(
                batch_id = %self.id,
                current = %self.state,
                reported = %state,
                "Ignoring non-monotonic batch state report"
            );
            return false;
        }

        self.state = state;
        self.state_message = message;
        if state.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        true
    }

    /// Store the result set; allowed once, and only in a terminal state
    pub(crate) fn set_result(&mut self, result: BatchResult) -> Result<()> {
        if !self.is_terminal() {
            return Err(BulkError::InvalidState {
                batch_id: self.id.clone(),
                state: self.state.to_string(),
            });
        }
        if self.result.is_some() {
            return Err(BulkError::Parsing(format!(
                "Result set of batch {} is already populated",
                self.id
            )));
        }
        self.result = Some(result);
        Ok(())
    }
}
