//! Client configuration injected once at startup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{FmsError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Identity provider endpoints and key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Public web API key of the identity project.
    pub api_key: String,
    pub identity_url: String,
    pub token_url: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

/// Top-level client configuration (`config.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    /// Per-request ceiling before a request is reported as `Timeout`.
    pub request_timeout_secs: u64,
    pub identity: IdentityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            identity: IdentityConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Rejects configurations the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(FmsError::config("base_url must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(FmsError::config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if !(MIN_REQUEST_TIMEOUT_SECS..=MAX_REQUEST_TIMEOUT_SECS)
            .contains(&self.request_timeout_secs)
        {
            return Err(FmsError::config(format!(
                "request_timeout_secs must be between {} and {}, got {}",
                MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS, self.request_timeout_secs
            )));
        }
        Ok(())
    }
}
