//! End-to-end bulk run: create, submit, close, poll, aggregate

use super::aggregator::ResultAggregator;
use super::polling::PollingScheduler;
use super::record::Record;
use super::report::{RejectedCollection, RunReport};
use super::submission::SubmissionManager;
use super::types::{Batch, JobSpec};
use crate::config::PollConfig;
use crate::core::client::BulkApi;
use crate::utils::error::{BulkError, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs one job from record collections to aggregated outcomes
#[derive(Clone)]
pub struct BulkOrchestrator {
    submission: SubmissionManager,
    scheduler: PollingScheduler,
    aggregator: ResultAggregator,
}

impl BulkOrchestrator {
    pub fn new(api: Arc<dyn BulkApi>, config: PollConfig) -> Result<Self> {
        Ok(Self {
            submission: SubmissionManager::new(api.clone()),
            scheduler: PollingScheduler::new(api.clone(), config)?,
            aggregator: ResultAggregator::new(api),
        })
    }

    pub fn submission(&self) -> &SubmissionManager {
        &self.submission
    }

    pub fn scheduler(&self) -> &PollingScheduler {
        &self.scheduler
    }

    pub fn aggregator(&self) -> &ResultAggregator {
        &self.aggregator
    }

    /// Submit every collection as its own batch under one job and collect
    /// the per-record outcomes
    ///
    /// A collection the service refuses is recorded in
    /// [`RunReport::rejected`] and the others still go through. A batch whose
    /// results cannot be fetched lands in [`RunReport::unfetched`] while the
    /// outcomes of the other batches are kept. The run only fails outright
    /// when job creation fails, every collection is refused, or polling is
    /// cancelled.
    pub async fn run(
        &self,
        spec: JobSpec,
        collections: Vec<Vec<Record>>,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("bulk_run", %run_id, entity = %spec.entity_type);
        self.run_inner(run_id, spec, collections, cancel)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        spec: JobSpec,
        collections: Vec<Vec<Record>>,
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        let started_at = Utc::now();
        let job = self.submission.create_job(&spec).await?;

        let mut batches: Vec<Batch> = Vec::with_capacity(collections.len());
        let mut rejected = Vec::new();
        for (index, records) in collections.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(BulkError::Cancelled);
            }
            match self.submission.submit_batch(&job, records).await {
                Ok(batch) => batches.push(batch),
                Err(error) if error.is_auth_error() => return Err(error),
                Err(error) => {
                    warn!(index, records = records.len(), error = %error, "Batch submission rejected");
                    rejected.push(RejectedCollection {
                        index,
                        record_count: records.len(),
                        error,
                    });
                }
            }
        }
        info!(
            submitted = batches.len(),
            rejected = rejected.len(),
            "Submitted batches"
        );

        if let Err(error) = self.submission.close_job(&job).await {
            warn!(job_id = %job.id(), error = %error, "Failed to close job");
        }

        if batches.is_empty() && !rejected.is_empty() {
            return Err(rejected.swap_remove(0).error);
        }

        let polled = self.scheduler.poll(batches, cancel).await?;
        let aggregated = self.aggregator.aggregate_all(polled.completed).await;

        let report = RunReport {
            run_id,
            job,
            outcomes: aggregated.outcomes,
            abandoned: polled.abandoned,
            unfetched: aggregated.unfetched,
            rejected,
            rounds: polled.rounds,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            records = report.outcomes.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            abandoned = report.abandoned.len(),
            unfetched = report.unfetched.len(),
            rounds = report.rounds,
            "Bulk run finished"
        );
        Ok(report)
    }
}
