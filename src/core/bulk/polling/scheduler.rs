//! Round-based polling of outstanding batches

use super::backoff::Backoff;
use crate::config::{PollConfig, Validate};
use crate::core::bulk::types::Batch;
use crate::core::client::{BatchInfo, BulkApi};
use crate::utils::error::{BulkError, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// A batch the scheduler stopped tracking before it reached a terminal state
#[derive(Debug)]
pub struct AbandonedBatch {
    pub batch: Batch,
    pub error: BulkError,
}

/// What a polling run ended with
#[derive(Debug, Default)]
pub struct PollOutcome {
    /// Terminal batches, in the order they were seen to complete
    pub completed: Vec<Batch>,
    /// Batches that errored permanently or ran out of time
    pub abandoned: Vec<AbandonedBatch>,
    /// Number of query rounds performed
    pub rounds: u32,
}

impl PollOutcome {
    /// Whether every batch reached a terminal state
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty()
    }
}

#[derive(Debug)]
struct PendingBatch {
    batch: Batch,
    /// Consecutive transient query failures
    failures: u32,
}

/// Drives a set of batches to terminal states
///
/// Each round queries every pending batch once. Batches reported terminal
/// move to the completed list; if anything is still pending the scheduler
/// sleeps for the next back-off delay and starts another round.
#[derive(Clone)]
pub struct PollingScheduler {
    api: Arc<dyn BulkApi>,
    config: PollConfig,
}

impl PollingScheduler {
    /// Fails with [`BulkError::Config`] when `config` does not validate, so a
    /// zero delay or deadline never reaches the polling loop.
    pub fn new(api: Arc<dyn BulkApi>, config: PollConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| BulkError::Config(format!("Polling config error: {}", e)))?;
        Ok(Self { api, config })
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll until no batch is pending
    ///
    /// Returns [`BulkError::Cancelled`] if `cancel` fires. Any other query
    /// failure only affects the batch it was raised for.
    #[instrument(skip_all, fields(batches = batches.len()))]
    pub async fn poll(
        &self,
        batches: Vec<Batch>,
        cancel: &CancellationToken,
    ) -> Result<PollOutcome> {
        let mut pending: Vec<PendingBatch> = batches
            .into_iter()
            .map(|batch| PendingBatch { batch, failures: 0 })
            .collect();
        let mut outcome = PollOutcome::default();
        let mut backoff = Backoff::from_config(&self.config);
        let deadline = self.config.deadline().map(|limit| (Instant::now() + limit, limit));
        let concurrency = self.config.query_concurrency;

        while !pending.is_empty() {
            if cancel.is_cancelled() {
                return Err(BulkError::Cancelled);
            }

            if let Some((at, limit)) = deadline {
                if Instant::now() >= at {
                    error!(
                        pending = pending.len(),
                        "Polling deadline reached, abandoning pending batches"
                    );
                    outcome.abandoned.extend(pending.drain(..).map(|entry| AbandonedBatch {
                        batch: entry.batch,
                        error: BulkError::DeadlineExceeded(limit),
                    }));
                    break;
                }
            }

            outcome.rounds += 1;
            let round = outcome.rounds;
            let current = std::mem::take(&mut pending);
            let queried = current.len();

            let responses: Vec<(PendingBatch, Result<BatchInfo>)> = stream::iter(current)
                .map(|entry| self.query(entry, cancel))
                .buffered(concurrency)
                .collect()
                .await;

            for (entry, response) in responses {
                self.settle(entry, response, &mut pending, &mut outcome)?;
            }

            if pending.is_empty() {
                info!(
                    round,
                    queried,
                    completed = outcome.completed.len(),
                    "Polling round finished, nothing pending"
                );
                break;
            }

            let mut delay = backoff.next_delay();
            if let Some((at, _)) = deadline {
                delay = delay.min(at.saturating_duration_since(Instant::now()));
            }
            info!(
                round,
                queried,
                pending = pending.len(),
                completed = outcome.completed.len(),
                next_delay = ?delay,
                "Polling round finished"
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(BulkError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        Ok(outcome)
    }

    async fn query(
        &self,
        entry: PendingBatch,
        cancel: &CancellationToken,
    ) -> (PendingBatch, Result<BatchInfo>) {
        if cancel.is_cancelled() {
            return (entry, Err(BulkError::Cancelled));
        }
        let response = self
            .api
            .get_batch_state(entry.batch.job_id(), entry.batch.id())
            .await;
        (entry, response)
    }

    /// Route one query response into pending, completed or abandoned
    fn settle(
        &self,
        mut entry: PendingBatch,
        response: Result<BatchInfo>,
        pending: &mut Vec<PendingBatch>,
        outcome: &mut PollOutcome,
    ) -> Result<()> {
        match response {
            Ok(info) => {
                entry.failures = 0;
                if entry.batch.observe(info.state, info.state_message) {
                    debug!(
                        batch_id = %entry.batch.id(),
                        state = %entry.batch.state(),
                        "Batch state changed"
                    );
                }
                if entry.batch.is_terminal() {
                    info!(
                        batch_id = %entry.batch.id(),
                        state = %entry.batch.state(),
                        "Batch finished"
                    );
                    outcome.completed.push(entry.batch);
                } else {
                    pending.push(entry);
                }
            }
            Err(BulkError::Cancelled) => return Err(BulkError::Cancelled),
            Err(error) if error.is_transient() => {
                entry.failures += 1;
                match self.config.max_transient_failures {
                    Some(limit) if entry.failures >= limit => {
                        error!(
                            batch_id = %entry.batch.id(),
                            failures = entry.failures,
                            error = %error,
                            "Giving up on batch after repeated query failures"
                        );
                        outcome.abandoned.push(AbandonedBatch {
                            batch: entry.batch,
                            error,
                        });
                    }
                    _ => {
                        warn!(
                            batch_id = %entry.batch.id(),
                            failures = entry.failures,
                            error = %error,
                            "Batch state query failed, retrying next round"
                        );
                        pending.push(entry);
                    }
                }
            }
            Err(error) => {
                error!(batch_id = %entry.batch.id(), error = %error, "Abandoning batch");
                outcome.abandoned.push(AbandonedBatch {
                    batch: entry.batch,
                    error,
                });
            }
        }
        Ok(())
    }
}
