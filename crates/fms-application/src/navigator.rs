//! Navigation state machine.
//!
//! Resolves requested views against the observable auth state, keeps the
//! current view and display preference, and persists both through the
//! credential store. Persistence failures are logged and never block
//! navigation.

use fms_core::error::Result;
use fms_core::navigation::{self, DisplayPreference, ViewId};
use fms_core::session::{AuthState, CredentialStore};
use std::sync::Arc;
use tokio::sync::watch;

/// Session-driven transitions applied by the session context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    SignedIn,
    SignedOut,
    Expired,
}

impl SessionTransition {
    fn target(self) -> ViewId {
        match self {
            SessionTransition::SignedIn => ViewId::Profile,
            SessionTransition::SignedOut => ViewId::Landing,
            SessionTransition::Expired => ViewId::Login,
        }
    }
}

pub struct Navigator {
    store: Arc<dyn CredentialStore>,
    auth: watch::Receiver<AuthState>,
    view: watch::Sender<ViewId>,
    preference: watch::Sender<DisplayPreference>,
}

impl Navigator {
    pub fn new(store: Arc<dyn CredentialStore>, auth: watch::Receiver<AuthState>) -> Self {
        let (view, _) = watch::channel(ViewId::default());
        let (preference, _) = watch::channel(DisplayPreference::default());
        Self {
            store,
            auth,
            view,
            preference,
        }
    }

    fn authenticated(&self) -> bool {
        self.auth.borrow().is_authenticated()
    }

    /// Restores the persisted view and display preference.
    ///
    /// The persisted view is re-validated against the current auth state.
    pub async fn restore(&self) -> Result<ViewId> {
        let state = self.store.load().await?;
        let resolved = navigation::resolve(self.authenticated(), state.last_view);

        self.preference.send_replace(state.display_preference);
        self.view.send_replace(resolved);

        if resolved != state.last_view {
            tracing::info!(
                "[Navigator] Persisted view {} requires sign-in, restored to {}",
                state.last_view,
                resolved
            );
            self.persist_view(resolved).await;
        }

        Ok(resolved)
    }

    /// Navigates to `requested` and returns the view actually shown.
    pub async fn navigate(&self, requested: ViewId) -> ViewId {
        let resolved = navigation::resolve(self.authenticated(), requested);
        if resolved != requested {
            tracing::debug!("[Navigator] {} redirected to {}", requested, resolved);
        }
        self.set_view(resolved).await;
        resolved
    }

    pub fn current(&self) -> ViewId {
        *self.view.borrow()
    }

    pub fn watch_view(&self) -> watch::Receiver<ViewId> {
        self.view.subscribe()
    }

    pub fn display_preference(&self) -> DisplayPreference {
        *self.preference.borrow()
    }

    pub async fn set_display_preference(&self, preference: DisplayPreference) -> DisplayPreference {
        self.preference.send_replace(preference);
        if let Err(e) = self.store.set_display_preference(preference).await {
            tracing::warn!("[Navigator] Failed to persist display preference: {}", e);
        }
        preference
    }

    pub async fn toggle_display_preference(&self) -> DisplayPreference {
        let next = self.display_preference().toggled();
        self.set_display_preference(next).await
    }

    pub(crate) async fn apply(&self, transition: SessionTransition) {
        let target = transition.target();
        tracing::debug!("[Navigator] {:?} -> {}", transition, target);
        self.set_view(target).await;
    }

    async fn set_view(&self, view: ViewId) {
        let previous = self.view.send_replace(view);
        if previous != view {
            self.persist_view(view).await;
        }
    }

    async fn persist_view(&self, view: ViewId) {
        if let Err(e) = self.store.set_last_view(view).await {
            tracing::warn!("[Navigator] Failed to persist view {}: {}", view, e);
        }
    }
}
