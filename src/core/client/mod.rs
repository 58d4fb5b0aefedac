//! Remote bulk service interface
//!
//! [`BulkApi`] is the seam between the orchestration logic and the
//! transport. [`ForceBulkClient`] implements it over HTTP; tests substitute
//! scripted fakes.

mod http;
mod types;

pub use http::ForceBulkClient;
pub use types::{BatchInfo, CreateJobRequest, JobInfo, RemoteFault};

use crate::core::bulk::{JobSpec, Record, RecordResult};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Operations consumed from the remote bulk service
///
/// Every call is one request/response exchange.
#[async_trait]
pub trait BulkApi: Send + Sync {
    /// Declare a job for an entity type and operation
    async fn create_job(&self, spec: &JobSpec) -> Result<JobInfo>;

    /// Submit one chunk of records under a job
    async fn create_batch(&self, job_id: &str, records: &[Record]) -> Result<BatchInfo>;

    /// Current state of a batch
    async fn get_batch_state(&self, job_id: &str, batch_id: &str) -> Result<BatchInfo>;

    /// Per-record results of a batch, in submission order
    async fn get_batch_result(&self, job_id: &str, batch_id: &str) -> Result<Vec<RecordResult>>;

    /// Stop accepting batches for a job
    async fn close_job(&self, job_id: &str) -> Result<JobInfo>;
}
