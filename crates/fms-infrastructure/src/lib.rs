//! Infrastructure layer of the FundMyStudy client.
//!
//! Adapters for the core ports: the reqwest backend client, the Firebase
//! identity provider, the TOML credential store, and config/path resolution.

pub mod config_service;
pub mod credential_store;
pub mod http;
pub mod identity;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::credential_store::{InMemoryCredentialStore, TomlCredentialStore};
pub use crate::http::HttpBackend;
pub use crate::identity::FirebaseIdentityProvider;
pub use crate::paths::{FmsPaths, ServiceType};
