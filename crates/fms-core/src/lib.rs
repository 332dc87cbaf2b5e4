//! Domain layer of the FundMyStudy client.
//!
//! Models, the error taxonomy, pure navigation rules and the ports the
//! infrastructure layer implements. Nothing in this crate performs I/O.

pub mod backend;
pub mod config;
pub mod error;
pub mod navigation;
pub mod profile;
pub mod reminder;
pub mod scholarship;
pub mod session;

pub use backend::ScholarshipBackend;
pub use config::ClientConfig;
pub use error::{FmsError, Result};
pub use navigation::{DisplayPreference, ViewId};
