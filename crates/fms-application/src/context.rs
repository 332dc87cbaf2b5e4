//! Composition root wiring the ports into the use cases.

use fms_core::backend::ScholarshipBackend;
use fms_core::config::ClientConfig;
use fms_core::error::Result;
use fms_core::session::{CredentialStore, IdentityProvider, Session};
use fms_infrastructure::paths::FmsPaths;
use fms_infrastructure::{FirebaseIdentityProvider, HttpBackend, TomlCredentialStore};
use std::sync::Arc;

use crate::eligibility::EligibilityFetcher;
use crate::navigator::Navigator;
use crate::profile_sync::ProfileSynchronizer;
use crate::reminders::ReminderManager;
use crate::session::{SessionContext, SessionManager};

pub struct ClientContext {
    config: ClientConfig,
    session_context: Arc<SessionContext>,
    pub session: SessionManager,
    pub profiles: Arc<ProfileSynchronizer>,
    pub eligibility: Arc<EligibilityFetcher>,
    pub reminders: Arc<ReminderManager>,
}

impl ClientContext {
    /// Wires the production adapters: TOML credential store, Firebase
    /// identity provider and the HTTP backend.
    pub fn from_config(config: ClientConfig, paths: &FmsPaths) -> Result<Self> {
        config.validate()?;
        let store: Arc<dyn CredentialStore> = Arc::new(TomlCredentialStore::new(paths)?);
        let identity: Arc<dyn IdentityProvider> = Arc::new(FirebaseIdentityProvider::new(&config)?);
        let backend: Arc<dyn ScholarshipBackend> = Arc::new(HttpBackend::new(&config)?);

        tracing::info!("[ClientContext] Backend at {}", config.base_url());
        Ok(Self::with_ports(config, store, identity, backend))
    }

    /// Wires arbitrary port implementations.
    pub fn with_ports(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn ScholarshipBackend>,
    ) -> Self {
        let timeout = config.request_timeout();
        let session_context = SessionContext::new(store, identity);

        let profiles = ProfileSynchronizer::new(session_context.clone(), backend.clone(), timeout);
        let eligibility = EligibilityFetcher::new(
            session_context.clone(),
            backend.clone(),
            profiles.clone(),
            timeout,
        );
        let reminders = ReminderManager::new(
            session_context.clone(),
            backend,
            eligibility.clone(),
            timeout,
        );
        let session = SessionManager::new(session_context.clone(), profiles.clone());

        Self {
            config,
            session_context,
            session,
            profiles,
            eligibility,
            reminders,
        }
    }

    /// Restores the persisted session, view and display preference.
    pub async fn start(&self) -> Result<Option<Session>> {
        self.session.restore().await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        self.session_context.navigator()
    }

    pub fn session_context(&self) -> &Arc<SessionContext> {
        &self.session_context
    }

    /// Cancels every in-flight request of every component.
    pub fn cancel_pending(&self) {
        self.profiles.cancel_pending();
        self.eligibility.cancel_pending();
        self.reminders.cancel_pending();
    }
}
