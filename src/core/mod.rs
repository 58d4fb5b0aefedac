//! Core functionality
//!
//! `bulk` holds the orchestration logic, `client` the remote service
//! interface it runs against.

pub mod bulk;
pub mod client;
