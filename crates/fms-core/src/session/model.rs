//! Session domain models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::identity::IssuedCredential;

/// The identity a credential was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id assigned by the identity provider.
    pub uid: String,
    /// Sign-in email; also the address reminders are sent to.
    pub email: String,
}

/// An authenticated session as persisted by the credential store.
///
/// The bearer `credential` is attached to every backend request. It is never
/// written to logs; the `Debug` impl redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token.
    pub credential: String,
    /// Token used to obtain a fresh credential without re-entering a password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub issued_at: DateTime<Utc>,
    /// Expiry reported by the identity provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub identity: Identity,
}

impl Session {
    /// Builds a session from a freshly issued credential.
    pub fn from_issued(issued: IssuedCredential, now: DateTime<Utc>) -> Self {
        let expires_at = issued
            .expires_in
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| now + d);
        Self {
            credential: issued.id_token,
            refresh_token: issued.refresh_token,
            identity: Identity {
                uid: issued.uid,
                email: issued.email,
            },
            issued_at: now,
            expires_at,
        }
    }

    /// Returns true when the credential expires within `margin` of `now`.
    ///
    /// Sessions without a reported expiry never count as expiring.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at.is_some_and(|at| at - now <= margin)
    }

    pub fn uid(&self) -> &str {
        &self.identity.uid
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credential", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("identity", &self.identity)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Observable authentication fact derived from the current session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Identity),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::SignedOut => None,
        }
    }
}

/// Lifecycle notifications published by the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { uid: String },
    SignedOut,
    /// The backend rejected the credential; the session was torn down.
    Expired,
    Refreshed { uid: String },
}
