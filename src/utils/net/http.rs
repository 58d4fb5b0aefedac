//! HTTP client construction
//!
//! Both the credential exchange and the bulk client talk to the same remote
//! service, so they share one `reqwest::Client` and its connection pool.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bulkforce::utils::net::http::build_client;
//!
//! let client = build_client(&ClientSettings::default())?;
//! let response = client.get("https://login.salesforce.com").send().await?;
//! ```

use crate::config::ClientSettings;
use crate::utils::error::{BulkError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// Idle connection timeout for pooled connections
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// TCP keepalive interval
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

/// Build an HTTP client from the configured settings
pub fn build_client(settings: &ClientSettings) -> Result<Client> {
    debug!(
        timeout_secs = settings.timeout_secs,
        connect_timeout_secs = settings.connect_timeout_secs,
        "Creating HTTP client"
    );

    ClientBuilder::new()
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        // Request timeouts
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        // TCP optimizations
        .tcp_keepalive(TCP_KEEPALIVE)
        .tcp_nodelay(true)
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(|e| BulkError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Join a relative path onto a base URL, tolerating a trailing slash on the base
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
