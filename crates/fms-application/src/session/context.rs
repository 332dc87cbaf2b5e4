//! Shared session context.
//!
//! Holds the in-memory session, the session epoch and the observable auth
//! state. Every component reaches the credential through [`SessionContext::authorize`]
//! and reports authentication failures through [`SessionContext::report_expired`],
//! which tears the session down once per epoch.

use async_trait::async_trait;
use chrono::Utc;
use fms_core::error::{FmsError, Result};
use fms_core::session::{
    AuthState, CredentialStore, Identity, IdentityProvider, Session, SessionEvent,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use tokio::sync::{MutexGuard, broadcast, watch};

use crate::navigator::{Navigator, SessionTransition};

/// Credentials expiring within this margin are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;
const EVENT_CAPACITY: usize = 32;

/// A component holding data scoped to one session.
///
/// Registered components are invalidated whenever the session epoch changes.
#[async_trait]
pub trait SessionScoped: Send + Sync {
    async fn invalidate(&self);
}

/// Bearer token together with the epoch it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTicket {
    pub token: String,
    pub epoch: u64,
}

impl std::fmt::Debug for AuthTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTicket")
            .field("token", &"<redacted>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Why a session is being torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Teardown {
    SignOut,
    Expired,
}

pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<Navigator>,
    session: RwLock<Option<Session>>,
    epoch: AtomicU64,
    auth: watch::Sender<AuthState>,
    events: broadcast::Sender<SessionEvent>,
    scoped: Mutex<Vec<Weak<dyn SessionScoped>>>,
    auth_lock: tokio::sync::Mutex<()>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>, identity: Arc<dyn IdentityProvider>) -> Arc<Self> {
        let (auth, auth_rx) = watch::channel(AuthState::SignedOut);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let navigator = Arc::new(Navigator::new(store.clone(), auth_rx));

        Arc::new(Self {
            store,
            identity,
            navigator,
            session: RwLock::new(None),
            epoch: AtomicU64::new(0),
            auth,
            events,
            scoped: Mutex::new(Vec::new()),
            auth_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub(crate) fn identity_provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    /// Registers a component for invalidation on every epoch change.
    pub fn register(&self, component: Weak<dyn SessionScoped>) {
        self.scoped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(component);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Synchronous read of the current bearer token.
    pub fn current_token(&self) -> Option<String> {
        self.read_session().as_ref().map(|s| s.credential.clone())
    }

    pub fn current_session(&self) -> Option<Session> {
        self.read_session().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.read_session().as_ref().map(|s| s.identity.clone())
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.auth.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns the credential to attach to an outbound request.
    ///
    /// Refreshes first when the credential is about to expire. Fails with
    /// `NotAuthenticated` when there is no session.
    pub async fn authorize(&self) -> Result<AuthTicket> {
        let (session, epoch) = self.session_with_epoch().ok_or(FmsError::NotAuthenticated)?;

        let needs_refresh = session.refresh_token.is_some()
            && session.expires_within(Utc::now(), chrono::Duration::seconds(REFRESH_MARGIN_SECS));

        let (session, epoch) = if needs_refresh {
            tracing::debug!("[SessionContext] Credential near expiry, refreshing");
            self.refresh_with_epoch().await?
        } else {
            (session, epoch)
        };

        Ok(AuthTicket {
            token: session.credential,
            epoch,
        })
    }

    /// Exchanges the refresh token for a new credential.
    ///
    /// A rejected refresh token tears the session down. A refresh that yields
    /// a different uid is treated as an identity switch.
    pub async fn refresh(&self) -> Result<Session> {
        self.refresh_with_epoch().await.map(|(session, _)| session)
    }

    async fn refresh_with_epoch(&self) -> Result<(Session, u64)> {
        let _guard = self.lock().await;

        let current = self.current_session().ok_or(FmsError::NotAuthenticated)?;
        let Some(refresh_token) = current.refresh_token.clone() else {
            self.teardown_locked(Teardown::Expired).await;
            return Err(FmsError::SessionExpired);
        };

        let mut issued = match self.identity.refresh(&refresh_token).await {
            Ok(issued) => issued,
            Err(FmsError::SessionExpired) => {
                tracing::info!("[SessionContext] Refresh token rejected");
                self.teardown_locked(Teardown::Expired).await;
                return Err(FmsError::SessionExpired);
            }
            Err(e) => return Err(e),
        };

        if issued.uid == current.identity.uid {
            if issued.email.is_empty() {
                issued.email = current.identity.email.clone();
            }
            if issued.refresh_token.is_none() {
                issued.refresh_token = Some(refresh_token);
            }
            let session = Session::from_issued(issued, Utc::now());
            self.store.save_session(&session).await?;
            *self.write_session() = Some(session.clone());

            tracing::info!("[SessionContext] Credential refreshed for uid={}", session.uid());
            let _ = self.events.send(SessionEvent::Refreshed {
                uid: session.uid().to_string(),
            });
            // Epoch changes only under the auth lock, which is held here.
            Ok((session, self.epoch()))
        } else {
            tracing::warn!(
                "[SessionContext] Refresh returned uid={} for uid={}, switching identity",
                issued.uid,
                current.identity.uid
            );
            let session = Session::from_issued(issued, Utc::now());
            self.install_locked(session.clone()).await?;
            Ok((session, self.epoch()))
        }
    }

    /// Reports an authentication failure observed by a request of `epoch`.
    ///
    /// Tears the session down unless that epoch is already gone.
    pub async fn report_expired(&self, epoch: u64) {
        let _guard = self.lock().await;
        if self.epoch() != epoch || self.read_session().is_none() {
            return;
        }
        tracing::info!("[SessionContext] Credential rejected by backend, session expired");
        self.teardown_locked(Teardown::Expired).await;
    }

    /// Loads the persisted session into memory.
    pub(crate) async fn restore(&self) -> Result<Option<Session>> {
        let _guard = self.lock().await;
        let state = self.store.load().await?;

        let restored = state.session;
        if let Some(session) = &restored {
            self.replace_session(Some(session.clone()));
            self.auth
                .send_replace(AuthState::SignedIn(session.identity.clone()));
            tracing::info!("[SessionContext] Restored session for uid={}", session.uid());
        }

        self.navigator.restore().await?;
        Ok(restored)
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.auth_lock.lock().await
    }

    /// Installs a new session. The caller holds the auth lock.
    pub(crate) async fn install_locked(&self, session: Session) -> Result<()> {
        self.store.save_session(&session).await?;

        let (_, epoch) = self.replace_session(Some(session.clone()));
        self.invalidate_scoped().await;

        self.auth
            .send_replace(AuthState::SignedIn(session.identity.clone()));
        let _ = self.events.send(SessionEvent::SignedIn {
            uid: session.uid().to_string(),
        });
        self.navigator.apply(SessionTransition::SignedIn).await;

        tracing::info!(
            "[SessionContext] Signed in uid={} (epoch {})",
            session.uid(),
            epoch
        );
        Ok(())
    }

    /// Clears the session. The caller holds the auth lock.
    ///
    /// A failure to clear the persisted credential is logged; the in-memory
    /// session is cleared regardless.
    pub(crate) async fn teardown_locked(&self, reason: Teardown) {
        if let Err(e) = self.store.clear_session().await {
            tracing::warn!("[SessionContext] Failed to clear persisted session: {}", e);
        }

        let (previous, epoch) = self.replace_session(None);
        self.invalidate_scoped().await;

        self.auth.send_replace(AuthState::SignedOut);
        let (event, transition) = match reason {
            Teardown::SignOut => (SessionEvent::SignedOut, SessionTransition::SignedOut),
            Teardown::Expired => (SessionEvent::Expired, SessionTransition::Expired),
        };
        let _ = self.events.send(event);
        self.navigator.apply(transition).await;

        tracing::info!(
            "[SessionContext] Session ended ({:?}) for uid={} (epoch {})",
            reason,
            previous.as_ref().map(|s| s.uid()).unwrap_or("-"),
            epoch
        );
    }

    async fn invalidate_scoped(&self) {
        let live: Vec<Arc<dyn SessionScoped>> = {
            let mut scoped = self
                .scoped
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            scoped.retain(|weak| weak.strong_count() > 0);
            scoped.iter().filter_map(Weak::upgrade).collect()
        };
        for component in live {
            component.invalidate().await;
        }
    }

    /// The session and its epoch, read together.
    fn session_with_epoch(&self) -> Option<(Session, u64)> {
        let session = self.read_session();
        session.as_ref().map(|s| (s.clone(), self.epoch()))
    }

    /// Swaps the session and bumps the epoch under one write guard.
    ///
    /// Returns the previous session and the new epoch.
    fn replace_session(&self, session: Option<Session>) -> (Option<Session>, u64) {
        let mut current = self.write_session();
        let previous = std::mem::replace(&mut *current, session);
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        (previous, epoch)
    }

    fn read_session(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_session(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
