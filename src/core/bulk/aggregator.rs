//! Result fetching and flattening

use super::result::{BatchResult, RecordOutcome};
use super::types::Batch;
use crate::core::client::BulkApi;
use crate::utils::error::{BulkError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches result sets of terminal batches and flattens them into one
/// per-record outcome list
#[derive(Clone)]
pub struct ResultAggregator {
    api: Arc<dyn BulkApi>,
}

impl ResultAggregator {
    pub fn new(api: Arc<dyn BulkApi>) -> Self {
        Self { api }
    }

    /// Fetch and store the result set of one terminal batch
    ///
    /// Fails with [`BulkError::InvalidState`] without touching the network
    /// when the batch is not terminal yet. A batch whose results were already
    /// fetched returns the stored set.
    pub async fn fetch_results(&self, batch: &mut Batch) -> Result<BatchResult> {
        if !batch.is_terminal() {
            return Err(BulkError::InvalidState {
                batch_id: batch.id().to_string(),
                state: batch.state().to_string(),
            });
        }

        if let Some(result) = batch.result() {
            return Ok(result.clone());
        }

        let items = self.api.get_batch_result(batch.job_id(), batch.id()).await?;
        if items.len() != batch.record_count() {
            return Err(BulkError::ResultCountMismatch {
                batch_id: batch.id().to_string(),
                expected: batch.record_count(),
                actual: items.len(),
            });
        }

        let result = BatchResult::new(batch.id(), items);
        debug!(
            batch_id = %batch.id(),
            records = result.len(),
            failed = result.failure_count(),
            "Fetched batch results"
        );
        batch.set_result(result.clone())?;
        Ok(result)
    }

    /// Fetch every batch's results and concatenate them in the given order
    ///
    /// The first fetch failure is returned as-is; no outcome is made up for
    /// the failing batch.
    pub async fn aggregate(&self, batches: Vec<Batch>) -> Result<Vec<RecordOutcome>> {
        let mut outcomes = Vec::with_capacity(batches.iter().map(Batch::record_count).sum());

        for mut batch in batches {
            let result = self.fetch_results(&mut batch).await?;
            outcomes.extend(tag_outcomes(result));
        }

        info!(outcomes = outcomes.len(), "Aggregated batch results");
        Ok(outcomes)
    }

    /// Like [`aggregate`](Self::aggregate), but a failed fetch only costs
    /// that batch's outcomes
    ///
    /// Every batch is attempted. Batches whose results could not be fetched
    /// come back in [`Aggregated::unfetched`] with their error.
    pub async fn aggregate_all(&self, batches: Vec<Batch>) -> Aggregated {
        let mut aggregated = Aggregated {
            outcomes: Vec::with_capacity(batches.iter().map(Batch::record_count).sum()),
            unfetched: Vec::new(),
        };

        for mut batch in batches {
            match self.fetch_results(&mut batch).await {
                Ok(result) => aggregated.outcomes.extend(tag_outcomes(result)),
                Err(error) => {
                    warn!(batch_id = %batch.id(), error = %error, "Could not fetch batch results");
                    aggregated.unfetched.push(FailedFetch { batch, error });
                }
            }
        }

        info!(
            outcomes = aggregated.outcomes.len(),
            unfetched = aggregated.unfetched.len(),
            "Aggregated batch results"
        );
        aggregated
    }
}

/// A terminal batch whose result set could not be fetched
#[derive(Debug)]
pub struct FailedFetch {
    pub batch: Batch,
    pub error: BulkError,
}

/// Outcomes gathered so far plus the batches that could not be fetched
#[derive(Debug, Default)]
pub struct Aggregated {
    pub outcomes: Vec<RecordOutcome>,
    pub unfetched: Vec<FailedFetch>,
}

fn tag_outcomes(result: BatchResult) -> impl Iterator<Item = RecordOutcome> {
    let batch_id = result.batch_id;
    result
        .items
        .into_iter()
        .enumerate()
        .map(move |(position, result)| RecordOutcome {
            batch_id: batch_id.clone(),
            position,
            result,
        })
}
