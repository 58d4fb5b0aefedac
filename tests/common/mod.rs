//! Common test utilities for bulkforce
//!
//! - A scripted in-memory bulk service with a timestamped call log
//! - Record fixtures
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::{BatchScript, RecordFactory, ScriptedService};
//!
//! #[tokio::test(start_paused = true)]
//! async fn my_test() {
//!     let service = Arc::new(ScriptedService::new(vec![BatchScript::completes_in(2)]));
//!     // ...
//! }
//! ```

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::RecordFactory;
pub use service::{batch_id, BatchScript, Call, ScriptedService, Step, JOB_ID};

/// Install a test subscriber; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("bulkforce=debug")
        .with_test_writer()
        .try_init();
}
