//! Identity provider port.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// A credential freshly issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub uid: String,
    pub email: String,
    /// Lifetime of `id_token` as reported by the provider.
    pub expires_in: Option<Duration>,
}

/// External identity provider that turns email/password pairs into bearer tokens.
///
/// Implementations map provider rejections onto the shared taxonomy:
/// `InvalidCredentials`, `EmailInUse`, `Validation`, and `SessionExpired`
/// for refresh tokens that are no longer accepted.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges email and password for a credential.
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedCredential>;

    /// Creates a new identity and returns its first credential.
    async fn sign_up(&self, email: &str, password: &str) -> Result<IssuedCredential>;

    /// Exchanges a refresh token for a new credential.
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedCredential>;
}
