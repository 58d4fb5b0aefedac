//! Wire types for the asynchronous bulk API (JSON content type)

use crate::core::bulk::{BatchState, JobState, OperationKind};
use serde::{Deserialize, Serialize};

/// Body of a job creation request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub operation: OperationKind,
    pub object: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id_field_name: Option<String>,
}

/// Job descriptor returned by the remote service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub id: String,
    pub state: JobState,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub operation: Option<OperationKind>,
    #[serde(default)]
    pub number_batches_total: Option<u64>,
}

/// Batch descriptor returned by the remote service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInfo {
    pub id: String,
    pub job_id: String,
    pub state: BatchState,
    #[serde(default)]
    pub state_message: Option<String>,
    #[serde(default)]
    pub number_records_processed: Option<u64>,
    #[serde(default)]
    pub number_records_failed: Option<u64>,
}

impl BatchInfo {
    /// Descriptor with just the fields the orchestrator reads
    pub fn new(id: impl Into<String>, job_id: impl Into<String>, state: BatchState) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            state,
            state_message: None,
            number_records_processed: None,
            number_records_failed: None,
        }
    }
}

/// Error body returned by the bulk endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFault {
    pub exception_code: String,
    #[serde(default)]
    pub exception_message: String,
}
