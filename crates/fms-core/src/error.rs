//! Error types for the FundMyStudy client core.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::reminder::Reminder;

/// A shared error type for the entire client core.
///
/// Variants follow the failure taxonomy the UI layer renders: local validation
/// problems, identity-provider rejections, session expiry, expected absence,
/// transport failures and the discard signals of the request sequencer.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FmsError {
    /// Local input rejected before any network dispatch.
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Sign-in rejected by the identity provider.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-up rejected because the email already has an identity.
    #[error("Email already in use")]
    EmailInUse,

    /// A previously valid credential is no longer accepted.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// An authenticated operation was attempted without a session.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Expected-absent remote resource.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Eligibility requested before a profile was saved.
    #[error("Profile incomplete: save your profile before checking eligibility")]
    ProfileIncomplete,

    /// The request did not complete within the configured ceiling.
    #[error("Request timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    /// The backend could not be reached at all.
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered with a failure.
    #[error("Server error{}: {detail}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    ServerError { status: Option<u16>, detail: String },

    /// A reminder for this scholarship already exists for the identity.
    #[error("Already subscribed to reminders for {scholarship_id}")]
    AlreadySubscribed {
        scholarship_id: String,
        existing: Option<Box<Reminder>>,
    },

    /// A newer request for the same resource was issued; this result was discarded.
    #[error("Superseded by a newer request")]
    Superseded,

    /// The session changed while the request was in flight; this result was discarded.
    #[error("Session changed while the request was in flight")]
    SessionChanged,

    /// The request was cancelled by component teardown.
    #[error("Request cancelled")]
    Cancelled,

    /// IO error (local storage)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FmsError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates a ServerError
    pub fn server(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::ServerError {
            status,
            detail: detail.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a local validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if the identity provider rejected sign-in or sign-up
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::EmailInUse)
    }

    /// Check if this is a transport failure (timeout or unreachable)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unreachable(_))
    }

    /// Check if the result was dropped by the concurrency model rather than failing.
    ///
    /// Discarded results must never be rendered as errors.
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Superseded | Self::SessionChanged | Self::Cancelled)
    }

    /// Check if the UI should offer a retry affordance
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Unreachable(_) | Self::ServerError { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FmsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FmsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FmsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FmsError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FmsError>`.
pub type Result<T> = std::result::Result<T, FmsError>;
