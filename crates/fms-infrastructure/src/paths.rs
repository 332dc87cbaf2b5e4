//! Unified path management for FundMyStudy local files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/fundmystudy/       # Config directory (platform specific)
//! ├── config.toml              # Client configuration
//! ├── state.toml               # Credential, last view, display preference
//! └── logs/                    # Application logs
//!     └── fundmystudy.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "fundmystudy";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for fms_core::FmsError {
    fn from(err: PathError) -> Self {
        fms_core::FmsError::config(err.to_string())
    }
}

/// Files the client keeps on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    /// `config.toml`
    Config,
    /// `state.toml`
    State,
    /// `logs/`
    Logs,
}

impl ServiceType {
    fn relative(self) -> &'static str {
        match self {
            ServiceType::Config => "config.toml",
            ServiceType::State => "state.toml",
            ServiceType::Logs => "logs",
        }
    }
}

/// Resolves local file locations.
///
/// With a base path every file lives directly under it; this is how tests
/// isolate themselves in a temporary directory.
#[derive(Debug, Clone, Default)]
pub struct FmsPaths {
    base: Option<PathBuf>,
}

impl FmsPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the directory holding all client files.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(service.relative()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_override() {
        let paths = FmsPaths::new(Some(Path::new("/tmp/fms-test")));
        assert_eq!(
            paths.get_path(ServiceType::State).unwrap(),
            PathBuf::from("/tmp/fms-test/state.toml")
        );
        assert_eq!(
            paths.get_path(ServiceType::Logs).unwrap(),
            PathBuf::from("/tmp/fms-test/logs")
        );
    }

    #[test]
    fn test_default_dir_name() {
        if let Ok(dir) = FmsPaths::default().config_dir() {
            assert!(dir.ends_with(APP_DIR_NAME));
        }
    }
}
