//! Credential exchange
//!
//! Obtains an access token and instance URL through the OAuth2
//! username/password flow. The bulk client only needs the resulting
//! [`Session`]; how it was obtained stays behind [`Authenticator`].

use crate::config::AuthConfig;
use crate::utils::error::{BulkError, Result};
use crate::utils::{mask_secret, truncate_string};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

/// Authenticated session with the remote service
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer/session token
    pub access_token: String,
    /// Base URL of the org instance
    pub instance_url: String,
    /// API version, e.g. `52.0`
    pub api_version: String,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        instance_url: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        let api_version: String = api_version.into();
        Self {
            access_token: access_token.into(),
            instance_url: instance_url.into(),
            api_version: api_version.trim_start_matches('v').to_string(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &mask_secret(&self.access_token))
            .field("instance_url", &self.instance_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Exchanges credentials for a session
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, config: &AuthConfig) -> Result<Session>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth2 password grant against the configured login endpoint
#[derive(Debug, Clone)]
pub struct PasswordFlowAuthenticator {
    http: Client,
}

impl PasswordFlowAuthenticator {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Authenticator for PasswordFlowAuthenticator {
    async fn authenticate(&self, config: &AuthConfig) -> Result<Session> {
        let token_url = config.token_url();
        info!(username = %config.username, url = %token_url, "Authenticating");

        let password = config.effective_password();
        let form = [
            ("grant_type", "password"),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
            ("username", config.username.as_str()),
            ("password", password.as_str()),
        ];

        let response = self
            .http
            .post(&token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| BulkError::AuthenticationFailed(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = match serde_json::from_str::<TokenError>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("HTTP {}: {}", status.as_u16(), truncate_string(&body, 200)),
            };
            return Err(BulkError::AuthenticationFailed(reason));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            BulkError::AuthenticationFailed(format!("unexpected token response: {}", e))
        })?;

        let session = Session::new(token.access_token, token.instance_url, &config.api_version);
        debug!(?session, "Authenticated");
        Ok(session)
    }
}
