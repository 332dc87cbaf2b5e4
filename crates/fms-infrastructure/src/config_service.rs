//! Loads [`ClientConfig`] from `config.toml` with environment overrides.
//!
//! Priority: environment variables > config.toml > built-in defaults.

use fms_core::config::ClientConfig;
use fms_core::error::{FmsError, Result};
use std::path::{Path, PathBuf};

use crate::paths::{FmsPaths, ServiceType};

pub const ENV_BASE_URL: &str = "FMS_BASE_URL";
pub const ENV_IDENTITY_API_KEY: &str = "FMS_IDENTITY_API_KEY";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "FMS_REQUEST_TIMEOUT_SECS";

pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(paths: &FmsPaths) -> Result<Self> {
        Ok(Self {
            path: paths.get_path(ServiceType::Config)?,
        })
    }

    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads, applies process environment overrides and validates.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigService::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(&self, env: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;

        if let Some(base_url) = env(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url;
        }
        if let Some(api_key) = env(ENV_IDENTITY_API_KEY).filter(|v| !v.trim().is_empty()) {
            config.identity.api_key = api_key;
        }
        if let Some(raw) = env(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout_secs = raw.trim().parse().map_err(|_| {
                FmsError::config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_REQUEST_TIMEOUT_SECS, raw
                ))
            })?;
        }

        config.validate()?;

        tracing::debug!(
            "[ConfigService] base_url={}, timeout={}s, identity key set: {}",
            config.base_url,
            config.request_timeout_secs,
            !config.identity.api_key.is_empty()
        );

        Ok(config)
    }

    fn load_file(&self) -> Result<ClientConfig> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(ClientConfig::default()),
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    "[ConfigService] No config at {:?}, using defaults",
                    self.path
                );
                Ok(ClientConfig::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(dir.path().join("config.toml"));

        let config = service.load_with_env(env_of(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://file.example\"\nrequest_timeout_secs = 20\n",
        )
        .unwrap();

        let config = ConfigService::with_path(&path)
            .load_with_env(env_of(&[
                (ENV_BASE_URL, "https://env.example"),
                (ENV_IDENTITY_API_KEY, "key-abc"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "https://env.example");
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.identity.api_key, "key-abc");
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(dir.path().join("config.toml"));

        let err = service
            .load_with_env(env_of(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")]))
            .unwrap_err();
        assert!(matches!(err, FmsError::Config(_)));

        let err = service
            .load_with_env(env_of(&[(ENV_REQUEST_TIMEOUT_SECS, "300")]))
            .unwrap_err();
        assert!(matches!(err, FmsError::Config(_)));
    }
}
