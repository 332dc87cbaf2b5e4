//! Profile synchronization: fetch and upsert of the identity's single profile.

use async_trait::async_trait;
use fms_core::backend::ScholarshipBackend;
use fms_core::error::{FmsError, Result};
use fms_core::profile::{Profile, ProfileCompleteness, ProfileDraft};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::request::{CancellationScope, RequestSequencer, run_bounded, settle_error};
use crate::session::{SessionContext, SessionScoped};

#[derive(Debug, Clone)]
struct ProfileState {
    epoch: u64,
    profile: Option<Profile>,
    completeness: ProfileCompleteness,
}

pub struct ProfileSynchronizer {
    ctx: Arc<SessionContext>,
    backend: Arc<dyn ScholarshipBackend>,
    timeout: Duration,
    sequencer: RequestSequencer,
    scope: CancellationScope,
    state: RwLock<Option<ProfileState>>,
}

impl ProfileSynchronizer {
    pub fn new(
        ctx: Arc<SessionContext>,
        backend: Arc<dyn ScholarshipBackend>,
        timeout: Duration,
    ) -> Arc<Self> {
        let this = Arc::new(Self {
            ctx: ctx.clone(),
            backend,
            timeout,
            sequencer: RequestSequencer::new(),
            scope: CancellationScope::new(),
            state: RwLock::new(None),
        });
        let weak: Weak<dyn SessionScoped> = Arc::downgrade(&this) as Weak<Self>;
        ctx.register(weak);
        this
    }

    /// Fetches the saved profile.
    ///
    /// `NotFound` is the expected outcome for a new identity and records the
    /// profile as missing.
    pub async fn fetch(&self) -> Result<Profile> {
        let auth = self.ctx.authorize().await?;
        let ticket = self.sequencer.issue(auth.epoch);

        let result = run_bounded(
            self.backend.fetch_profile(&auth.token),
            self.timeout,
            self.scope.token(),
        )
        .await;

        match result {
            Ok(profile) => {
                let mut state = self.state.write().await;
                if self.ctx.epoch() != ticket.epoch {
                    return Err(FmsError::SessionChanged);
                }
                if !self.sequencer.is_latest(&ticket) {
                    return Err(FmsError::Superseded);
                }
                let completeness = if profile.has_required_fields() {
                    ProfileCompleteness::Complete
                } else {
                    ProfileCompleteness::Missing
                };
                *state = Some(ProfileState {
                    epoch: ticket.epoch,
                    profile: Some(profile.clone()),
                    completeness,
                });
                Ok(profile)
            }
            Err(e) if e.is_not_found() => {
                let mut state = self.state.write().await;
                if self.ctx.epoch() != ticket.epoch {
                    return Err(FmsError::SessionChanged);
                }
                if self.sequencer.is_latest(&ticket) {
                    tracing::debug!("[ProfileSync] No saved profile yet");
                    *state = Some(ProfileState {
                        epoch: ticket.epoch,
                        profile: None,
                        completeness: ProfileCompleteness::Missing,
                    });
                }
                Err(e)
            }
            Err(e) => {
                let superseded = !self.sequencer.is_latest(&ticket);
                Err(settle_error(&self.ctx, ticket.epoch, superseded, e).await)
            }
        }
    }

    /// Validates and upserts the profile.
    ///
    /// Validation runs before any request; no request is sent without a
    /// session. When the backend only acknowledges the write, the validated
    /// profile that was sent is returned.
    pub async fn save(&self, draft: &ProfileDraft) -> Result<Profile> {
        let profile = draft.validate()?;
        let auth = self.ctx.authorize().await?;
        let ticket = self.sequencer.issue(auth.epoch);

        let result = run_bounded(
            self.backend.save_profile(&auth.token, &profile),
            self.timeout,
            self.scope.token(),
        )
        .await;

        match result {
            Ok(echoed) => {
                let saved = echoed.unwrap_or(profile);
                let mut state = self.state.write().await;
                if self.ctx.epoch() != ticket.epoch {
                    return Err(FmsError::SessionChanged);
                }
                // The write succeeded either way; only the latest call updates the cache.
                if self.sequencer.is_latest(&ticket) {
                    *state = Some(ProfileState {
                        epoch: ticket.epoch,
                        profile: Some(saved.clone()),
                        completeness: ProfileCompleteness::Complete,
                    });
                }
                tracing::info!("[ProfileSync] Profile saved");
                Ok(saved)
            }
            Err(e) => Err(settle_error(&self.ctx, ticket.epoch, false, e).await),
        }
    }

    /// Last profile fetched or saved in the current session.
    pub async fn cached(&self) -> Option<Profile> {
        let epoch = self.ctx.epoch();
        self.state
            .read()
            .await
            .as_ref()
            .filter(|s| s.epoch == epoch)
            .and_then(|s| s.profile.clone())
    }

    pub async fn completeness(&self) -> ProfileCompleteness {
        let epoch = self.ctx.epoch();
        self.state
            .read()
            .await
            .as_ref()
            .filter(|s| s.epoch == epoch)
            .map(|s| s.completeness)
            .unwrap_or_default()
    }

    /// Cancels every in-flight request of this component.
    pub fn cancel_pending(&self) {
        self.scope.cancel_all();
    }
}

#[async_trait]
impl SessionScoped for ProfileSynchronizer {
    async fn invalidate(&self) {
        self.state.write().await.take();
    }
}
