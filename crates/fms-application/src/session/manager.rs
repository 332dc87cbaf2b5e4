use chrono::Utc;
use fms_core::error::{FmsError, Result};
use fms_core::profile::{Profile, ProfileDraft};
use fms_core::session::credentials;
use fms_core::session::{AuthState, Identity, Session, SessionEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use super::context::{SessionContext, Teardown};
use crate::profile_sync::ProfileSynchronizer;

/// Result of a sign-up.
///
/// The identity and the profile are committed independently: a failed
/// profile save leaves `session` valid and `profile` carrying the error, so
/// the caller can retry the save on its own.
#[derive(Debug)]
pub struct SignUpOutcome {
    pub session: Session,
    pub profile: Result<Profile>,
}

impl SignUpOutcome {
    pub fn is_complete(&self) -> bool {
        self.profile.is_ok()
    }
}

/// Owns the authentication lifecycle.
///
/// `SessionManager` is responsible for:
/// - Signing in and signing up against the identity provider
/// - Signing out and tearing down session-scoped state
/// - Refreshing and restoring the credential
/// - Exposing the observable auth state
pub struct SessionManager {
    ctx: Arc<SessionContext>,
    profiles: Arc<ProfileSynchronizer>,
}

impl SessionManager {
    pub fn new(ctx: Arc<SessionContext>, profiles: Arc<ProfileSynchronizer>) -> Self {
        Self { ctx, profiles }
    }

    /// Signs in and navigates to the profile view.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        credentials::validate_sign_in(email, password)?;

        let _guard = self.ctx.lock().await;
        let issued = self
            .ctx
            .identity_provider()
            .sign_in(email, password)
            .await
            .inspect_err(|e| tracing::warn!("[SessionManager] Sign-in failed: {}", e))?;

        let session = Session::from_issued(issued, Utc::now());
        self.ctx.install_locked(session.clone()).await?;
        Ok(session)
    }

    /// Creates an identity, signs in, and saves the initial profile.
    ///
    /// The draft is validated before the identity is created. A profile save
    /// failure after that point is reported in [`SignUpOutcome::profile`].
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        draft: &ProfileDraft,
    ) -> Result<SignUpOutcome> {
        let email = email.trim();
        credentials::validate_sign_up(email, password)?;
        draft.validate()?;

        let session = {
            let _guard = self.ctx.lock().await;
            let issued = self
                .ctx
                .identity_provider()
                .sign_up(email, password)
                .await
                .inspect_err(|e| tracing::warn!("[SessionManager] Sign-up failed: {}", e))?;

            let session = Session::from_issued(issued, Utc::now());
            self.ctx.install_locked(session.clone()).await?;
            session
        };

        let profile = self.profiles.save(draft).await;
        if let Err(e) = &profile {
            tracing::warn!(
                "[SessionManager] Identity uid={} created but profile save failed: {}",
                session.uid(),
                e
            );
        }

        Ok(SignUpOutcome { session, profile })
    }

    /// Signs out. A no-op when no session exists.
    pub async fn sign_out(&self) -> Result<()> {
        let _guard = self.ctx.lock().await;
        if self.ctx.current_session().is_none() {
            tracing::debug!("[SessionManager] Sign-out without a session");
            return Ok(());
        }
        self.ctx.teardown_locked(Teardown::SignOut).await;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<Session> {
        self.ctx.refresh().await
    }

    /// Restores the persisted session and view on startup.
    ///
    /// A corrupt or unreadable local state document is logged and treated as
    /// signed out rather than failing startup.
    pub async fn restore(&self) -> Result<Option<Session>> {
        match self.ctx.restore().await {
            Ok(session) => Ok(session),
            Err(e @ (FmsError::Io { .. } | FmsError::Serialization { .. })) => {
                tracing::warn!("[SessionManager] Could not restore local state: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn current_token(&self) -> Option<String> {
        self.ctx.current_token()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.ctx.current_identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.auth_state().is_authenticated()
    }

    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.ctx.watch()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.ctx.subscribe_events()
    }
}
