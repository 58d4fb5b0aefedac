//! Integration tests for bulkforce
//!
//! These tests drive the public API end to end, against either the
//! scripted in-memory service or a local HTTP mock server.

pub mod http_client_tests;
pub mod scenario_tests;
