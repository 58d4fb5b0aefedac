//! Job creation and batch submission

use super::record::Record;
use super::types::{Batch, Job, JobSpec, JobState};
use crate::core::client::BulkApi;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::info;

/// Turns a job spec plus record collections into remote batches
///
/// Record contents are passed through untouched; field problems show up
/// later in the per-record results.
#[derive(Clone)]
pub struct SubmissionManager {
    api: Arc<dyn BulkApi>,
}

impl SubmissionManager {
    pub fn new(api: Arc<dyn BulkApi>) -> Self {
        Self { api }
    }

    /// Create the job every batch of this run is submitted under
    pub async fn create_job(&self, spec: &JobSpec) -> Result<Job> {
        spec.validate()?;

        let info = self.api.create_job(spec).await?;
        info!(
            job_id = %info.id,
            entity = %spec.entity_type,
            operation = %spec.operation,
            "Created job"
        );

        Ok(Job::new(info.id, spec.entity_type.clone(), spec.operation))
    }

    /// Submit one collection of records as a batch
    pub async fn submit_batch(&self, job: &Job, records: &[Record]) -> Result<Batch> {
        let info = self.api.create_batch(job.id(), records).await?;
        info!(
            job_id = %job.id(),
            batch_id = %info.id,
            records = records.len(),
            state = %info.state,
            "Submitted batch"
        );

        Ok(Batch::new(info.id, job.id(), info.state, records.len())
            .with_state_message(info.state_message))
    }

    /// Close the job so the service stops waiting for more batches
    pub async fn close_job(&self, job: &Job) -> Result<JobState> {
        let info = self.api.close_job(job.id()).await?;
        info!(job_id = %job.id(), state = ?info.state, "Closed job");
        Ok(info.state)
    }
}
