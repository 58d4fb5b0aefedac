//! Summary of one orchestration run

use super::aggregator::FailedFetch;
use super::polling::AbandonedBatch;
use super::result::RecordOutcome;
use super::types::Job;
use crate::utils::error::BulkError;
use crate::utils::format_duration;
use chrono::{DateTime, Utc};
use std::fmt::Write;
use uuid::Uuid;

/// A record collection the service refused to accept as a batch
#[derive(Debug)]
pub struct RejectedCollection {
    /// Position of the collection in the submitted list
    pub index: usize,
    pub record_count: usize,
    pub error: BulkError,
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub job: Job,
    /// Per-record outcomes, grouped by batch in completion order
    pub outcomes: Vec<RecordOutcome>,
    pub abandoned: Vec<AbandonedBatch>,
    /// Terminal batches whose result sets could not be fetched
    pub unfetched: Vec<FailedFetch>,
    pub rejected: Vec<RejectedCollection>,
    pub rounds: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Whether every collection was submitted, every batch finished and
    /// every result set was fetched
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty() && self.rejected.is_empty() && self.unfetched.is_empty()
    }

    /// Wall-clock duration in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Console rendering, one line per record plus error detail lines
    pub fn render(&self) -> String {
        let mut out = String::new();

        for outcome in &self.outcomes {
            let result = &outcome.result;
            let _ = writeln!(
                out,
                "Id:{}, Created:{}, Success:{}, Errors:{}",
                result.id.as_deref().unwrap_or_default(),
                result.created,
                result.success,
                result.error.is_some()
            );
            if let Some(error) = &result.error {
                let _ = writeln!(out, "\tErrors:");
                for field in &error.fields {
                    let _ = writeln!(out, "\tField:{}", field);
                }
                let _ = writeln!(out, "\t{}", error.message);
                let _ = writeln!(out, "\t{}", error.status_code);
            }
        }

        for rejected in &self.rejected {
            let _ = writeln!(
                out,
                "Collection {} ({} records) rejected: {}",
                rejected.index, rejected.record_count, rejected.error
            );
        }
        for abandoned in &self.abandoned {
            let _ = writeln!(
                out,
                "Batch {} abandoned in state {}: {}",
                abandoned.batch.id(),
                abandoned.batch.state(),
                abandoned.error
            );
        }

        for unfetched in &self.unfetched {
            let _ = writeln!(
                out,
                "Batch {} finished as {} but its results are unavailable: {}",
                unfetched.batch.id(),
                unfetched.batch.state(),
                unfetched.error
            );
        }

        let _ = writeln!(
            out,
            "{} records: {} succeeded, {} failed ({} polling rounds, {})",
            self.outcomes.len(),
            self.succeeded(),
            self.failed(),
            self.rounds,
            format_duration(self.elapsed_ms())
        );
        out
    }
}
