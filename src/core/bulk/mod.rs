//! Job and batch lifecycle
//!
//! Submission creates one batch per record collection, the polling
//! scheduler drives the batches to terminal states, and the aggregator
//! turns their result sets into one per-record outcome list.

mod aggregator;
mod orchestrator;
mod polling;
mod record;
mod report;
mod result;
mod submission;
mod types;


pub use aggregator::{Aggregated, FailedFetch, ResultAggregator};
pub use orchestrator::BulkOrchestrator;
pub use polling::{
    delay_after_round, AbandonedBatch, Backoff, PollOutcome, PollingScheduler,
};
pub use record::{FieldValue, Record};
pub use report::{RejectedCollection, RunReport};
pub use result::{BatchResult, RecordError, RecordOutcome, RecordResult, UNKNOWN_STATUS_CODE};
pub use submission::SubmissionManager;
pub use types::{Batch, BatchState, Job, JobSpec, JobState, OperationKind};
