//! Utility modules
//!
//! - **error**: crate error type and error-chain rendering
//! - **logging**: tracing subscriber setup
//! - **net**: HTTP client construction

pub mod error; // Error handling
pub mod logging; // Logging
pub mod net; // Network & client utilities

pub use error::{BulkError, Result};

/// Format duration as human readable string
pub fn format_duration(duration_ms: u64) -> String {
    if duration_ms < 1000 {
        format!("{}ms", duration_ms)
    } else if duration_ms < 60_000 {
        format!("{:.1}s", duration_ms as f64 / 1000.0)
    } else if duration_ms < 3_600_000 {
        format!("{:.1}m", duration_ms as f64 / 60_000.0)
    } else {
        format!("{:.1}h", duration_ms as f64 / 3_600_000.0)
    }
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Mask a secret for logging, keeping only a short prefix
pub fn mask_secret(secret: &str) -> String {
    if secret.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        let prefix: String = secret.chars().take(4).collect();
        format!("{}...[REDACTED]", prefix)
    }
}
