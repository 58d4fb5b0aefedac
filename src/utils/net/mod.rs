//! Network utilities
//!
//! This module provides HTTP client construction shared by the credential
//! exchange and the bulk client.

pub mod http;

pub use http::*;
