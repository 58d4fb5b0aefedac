//! # bulkforce
//!
//! Client-side orchestration of asynchronous bulk jobs: create a job, submit
//! record collections as batches, poll them with exponential back-off until
//! every batch is terminal, then flatten the per-batch results into one
//! per-record outcome list.
//!
//! ## Features
//!
//! - **Loosely-typed records**: arbitrary field names mapped to string, number, bool or null
//! - **Back-off polling**: configurable initial delay and growth factor, optional cap and deadline
//! - **Failure separation**: transient query failures are retried, permanent ones abandon the batch
//! - **Cancellation**: cooperative, via `CancellationToken`
//! - **Normalised results**: heterogeneous result rows decoded into one shape
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulkforce::{connect, BulkConfig, BulkOrchestrator, JobSpec, OperationKind, Record};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BulkConfig::load(None)?;
//!     let client = connect(&config).await?;
//!
//!     let orchestrator = BulkOrchestrator::new(Arc::new(client), config.polling.clone())?;
//!     let report = orchestrator
//!         .run(
//!             JobSpec::new("Account", OperationKind::Insert),
//!             vec![vec![Record::new().with("Name", "Acme")]],
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!
//!     print!("{}", report.render());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use auth::{Authenticator, PasswordFlowAuthenticator, Session};
pub use config::{BulkConfig, PollConfig};
pub use utils::error::{BulkError, Result};

pub use core::bulk::{
    AbandonedBatch, Batch, BatchResult, BatchState, BulkOrchestrator, FailedFetch, FieldValue,
    Job, JobSpec, OperationKind, PollOutcome, PollingScheduler, Record, RecordError, RecordOutcome,
    RecordResult, RejectedCollection, ResultAggregator, RunReport, SubmissionManager,
};
pub use core::client::{BulkApi, ForceBulkClient};

use tracing::info;

/// Authenticate with the configured credentials and return a ready client
pub async fn connect(config: &BulkConfig) -> Result<ForceBulkClient> {
    let http = utils::net::build_client(&config.client)?;

    let session = PasswordFlowAuthenticator::new(http.clone())
        .authenticate(&config.auth)
        .await?;
    info!(instance = %session.instance_url, version = %session.api_version, "Connected");

    Ok(ForceBulkClient::new(http, session))
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
