//! Configuration data models

use crate::utils::mask_secret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Production login endpoint
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Sandbox login endpoint
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";

/// Path of the OAuth2 token endpoint below the login URL
pub const TOKEN_PATH: &str = "/services/oauth2/token";

/// Default API version
pub fn default_api_version() -> String {
    "52.0".to_string()
}

/// Default initial poll delay in milliseconds
pub fn default_initial_delay_ms() -> u64 {
    1
}

/// Default poll delay growth factor
pub fn default_growth_factor() -> f64 {
    2.0
}

/// Default number of state queries in flight per round
pub fn default_query_concurrency() -> usize {
    1
}

/// Default request timeout in seconds
pub fn default_timeout_secs() -> u64 {
    60
}

/// Default connect timeout in seconds
pub fn default_connect_timeout_secs() -> u64 {
    10
}

/// Default user agent
pub fn default_user_agent() -> String {
    concat!("bulkforce/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Default log level
pub fn default_log_level() -> String {
    "info".to_string()
}

/// Credentials and endpoint selection for the OAuth2 password flow
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Connected app consumer key
    pub client_id: String,
    /// Connected app consumer secret
    pub client_secret: String,
    /// Login username
    pub username: String,
    /// Login password, without the security token
    pub password: String,
    /// Security token appended to the password
    pub security_token: String,
    /// Authenticate against the sandbox login endpoint
    pub is_sandbox: bool,
    /// Explicit login URL, overrides `is_sandbox`
    pub login_url: Option<String>,
    /// API version used for bulk calls
    pub api_version: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            security_token: String::new(),
            is_sandbox: false,
            login_url: None,
            api_version: default_api_version(),
        }
    }
}

impl AuthConfig {
    /// Login URL selected by `login_url` or the sandbox flag
    pub fn login_url(&self) -> &str {
        match &self.login_url {
            Some(url) => url.as_str(),
            None if self.is_sandbox => SANDBOX_LOGIN_URL,
            None => PRODUCTION_LOGIN_URL,
        }
    }

    /// Full token endpoint URL
    pub fn token_url(&self) -> String {
        format!("{}{}", self.login_url().trim_end_matches('/'), TOKEN_PATH)
    }

    /// Password as sent to the token endpoint
    pub fn effective_password(&self) -> String {
        format!("{}{}", self.password, self.security_token)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &mask_secret(&self.client_id))
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("security_token", &"[REDACTED]")
            .field("is_sandbox", &self.is_sandbox)
            .field("login_url", &self.login_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Whole milliseconds, rounded up so a non-zero duration never becomes zero
fn ceil_millis(duration: Duration) -> u64 {
    let millis = duration.as_millis();
    let rounded = if duration.subsec_nanos() % 1_000_000 == 0 {
        millis
    } else {
        millis + 1
    };
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Polling back-off policy
///
/// The delay after round `k` is `initial_delay * growth_factor^(k-1)`. With
/// the defaults there is no cap and no deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Delay after the first round, in milliseconds
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after every round
    pub growth_factor: f64,
    /// Upper bound for the delay, in milliseconds
    pub max_delay_ms: Option<u64>,
    /// Overall polling budget, in milliseconds
    pub deadline_ms: Option<u64>,
    /// Consecutive transient failures after which a batch is abandoned
    pub max_transient_failures: Option<u32>,
    /// State queries in flight per round
    pub query_concurrency: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            growth_factor: default_growth_factor(),
            max_delay_ms: None,
            deadline_ms: None,
            max_transient_failures: None,
            query_concurrency: default_query_concurrency(),
        }
    }
}

impl PollConfig {
    /// Create a new config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = ceil_millis(delay);
        self
    }

    /// Set the growth factor
    pub fn with_growth_factor(mut self, factor: f64) -> Self {
        self.growth_factor = factor;
        self
    }

    /// Cap the delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_ms = Some(ceil_millis(delay));
        self
    }

    /// Set an overall polling deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline_ms = Some(ceil_millis(deadline));
        self
    }

    /// Abandon a batch after this many consecutive transient failures
    pub fn with_max_transient_failures(mut self, limit: u32) -> Self {
        self.max_transient_failures = Some(limit);
        self
    }

    /// Set query concurrency
    pub fn with_query_concurrency(mut self, concurrency: usize) -> Self {
        self.query_concurrency = concurrency.max(1);
        self
    }

    /// Initial delay as a `Duration`
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    /// Delay cap as a `Duration`
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay_ms.map(Duration::from_millis)
    }

    /// Deadline as a `Duration`
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `bulkforce=debug`
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}
