//! Configuration management
//!
//! Configuration is an explicit value handed to the components that need it.
//! It can be loaded from a YAML file, from the environment (including a
//! `.env` file), or both, with the environment taking precedence.

pub mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{BulkError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Credential exchange settings
    pub auth: AuthConfig,
    /// Polling back-off policy
    pub polling: PollConfig,
    /// HTTP client settings
    pub client: ClientSettings,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl BulkConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| {
            BulkError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: BulkConfig = serde_yaml::from_str(&content).map_err(|e| {
            BulkError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        debug!("Configuration file parsed");
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_process_env()?;
        Ok(config)
    }

    /// Load from an optional file, overlay the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_process_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_process_env(&mut self) -> Result<()> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.auth
            .validate()
            .map_err(|e| BulkError::Config(format!("Auth config error: {}", e)))?;

        self.polling
            .validate()
            .map_err(|e| BulkError::Config(format!("Polling config error: {}", e)))?;

        self.client
            .validate()
            .map_err(|e| BulkError::Config(format!("Client config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }
}
