//! Environment variable overlay

use super::BulkConfig;
use crate::utils::error::{BulkError, Result};
use std::str::FromStr;
use tracing::debug;

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| BulkError::Config(format!("Invalid {}: {}", key, e)))
}

/// Case-insensitive boolean, accepting `true`/`false`, `1`/`0` and `yes`/`no`
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

impl BulkConfig {
    /// Overlay values found through `lookup` onto this configuration
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Applying environment overrides");

        // Credentials
        if let Some(v) = lookup("SF_CONSUMER_KEY") {
            self.auth.client_id = v;
        }
        if let Some(v) = lookup("SF_CONSUMER_SECRET") {
            self.auth.client_secret = v;
        }
        if let Some(v) = lookup("SF_USERNAME") {
            self.auth.username = v;
        }
        if let Some(v) = lookup("SF_PASSWORD") {
            self.auth.password = v;
        }
        if let Some(v) = lookup("SF_SECURITY_TOKEN") {
            self.auth.security_token = v;
        }
        if let Some(v) = lookup("SF_IS_SANDBOX") {
            self.auth.is_sandbox = parse_flag(&v).ok_or_else(|| {
                BulkError::Config(format!("Invalid SF_IS_SANDBOX: {}", v))
            })?;
        }
        if let Some(v) = lookup("SF_LOGIN_URL") {
            self.auth.login_url = Some(v);
        }
        if let Some(v) = lookup("SF_API_VERSION") {
            self.auth.api_version = v;
        }

        // Polling
        if let Some(v) = lookup("BULK_POLL_INITIAL_DELAY_MS") {
            self.polling.initial_delay_ms = parse_var("BULK_POLL_INITIAL_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("BULK_POLL_GROWTH_FACTOR") {
            self.polling.growth_factor = parse_var("BULK_POLL_GROWTH_FACTOR", &v)?;
        }
        if let Some(v) = lookup("BULK_POLL_MAX_DELAY_MS") {
            self.polling.max_delay_ms = Some(parse_var("BULK_POLL_MAX_DELAY_MS", &v)?);
        }
        if let Some(v) = lookup("BULK_POLL_DEADLINE_MS") {
            self.polling.deadline_ms = Some(parse_var("BULK_POLL_DEADLINE_MS", &v)?);
        }
        if let Some(v) = lookup("BULK_POLL_MAX_TRANSIENT_FAILURES") {
            self.polling.max_transient_failures =
                Some(parse_var("BULK_POLL_MAX_TRANSIENT_FAILURES", &v)?);
        }
        if let Some(v) = lookup("BULK_POLL_QUERY_CONCURRENCY") {
            self.polling.query_concurrency = parse_var("BULK_POLL_QUERY_CONCURRENCY", &v)?;
        }

        // Client and logging
        if let Some(v) = lookup("BULK_HTTP_TIMEOUT_SECS") {
            self.client.timeout_secs = parse_var("BULK_HTTP_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("BULK_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("BULK_LOG_FORMAT") {
            self.logging.format = v.parse().map_err(BulkError::Config)?;
        }

        Ok(())
    }
}
