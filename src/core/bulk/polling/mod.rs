//! Batch completion discovery
//!
//! [`PollingScheduler`] owns the pending set for one run and sleeps between
//! rounds according to [`Backoff`].

mod backoff;
mod scheduler;

pub use backoff::{delay_after_round, Backoff};
pub use scheduler::{AbandonedBatch, PollOutcome, PollingScheduler};
