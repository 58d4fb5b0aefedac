//! Configuration validation

use super::models::*;
use tracing::debug;
use url::Url;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating auth configuration");

        let required = [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("username", &self.username),
            ("password", &self.password),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required", name));
            }
        }

        let url = Url::parse(self.login_url())
            .map_err(|e| format!("login URL has invalid format: {}", e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!(
                "login URL must use http:// or https:// scheme, got: {}",
                url.scheme()
            ));
        }

        if self.api_version.trim().is_empty() {
            return Err("api_version cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Validate for PollConfig {
    fn validate(&self) -> Result<(), String> {
        if self.initial_delay_ms == 0 {
            return Err("Initial poll delay must be greater than 0".to_string());
        }

        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err("Poll growth factor must be at least 1.0".to_string());
        }

        if let Some(max) = self.max_delay_ms {
            if max < self.initial_delay_ms {
                return Err("Max poll delay must not be below the initial delay".to_string());
            }
        }

        if self.deadline_ms == Some(0) {
            return Err("Poll deadline must be greater than 0".to_string());
        }

        if self.max_transient_failures == Some(0) {
            return Err("Max transient failures must be greater than 0".to_string());
        }

        if self.query_concurrency == 0 {
            return Err("Query concurrency must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.connect_timeout_secs == 0 {
            return Err("Connect timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
