//! Credential store implementations.
//!
//! `TomlCredentialStore` persists [`LocalState`] to `state.toml`;
//! `InMemoryCredentialStore` keeps it in process for tests and ephemeral runs.

use async_trait::async_trait;
use fms_core::error::{FmsError, Result};
use fms_core::navigation::{DisplayPreference, ViewId};
use fms_core::session::{CredentialStore, LocalState, Session};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::paths::{FmsPaths, ServiceType};
use crate::storage::{AtomicTomlError, AtomicTomlFile};

/// File-backed credential store.
///
/// The last loaded or written state is cached in memory; file I/O runs on
/// the blocking pool so callers on the async runtime are never blocked.
#[derive(Clone)]
pub struct TomlCredentialStore {
    file: Arc<AtomicTomlFile<LocalState>>,
    cache: Arc<Mutex<Option<LocalState>>>,
}

impl TomlCredentialStore {
    /// Creates a store at the default location resolved by `paths`.
    pub fn new(paths: &FmsPaths) -> Result<Self> {
        let path = paths.get_path(ServiceType::State)?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Applies `f` to the stored state under the file lock and refreshes the cache.
    async fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut LocalState) + Send + 'static,
    {
        let mut cache = self.cache.lock().await;
        let file = self.file.clone();

        let written = tokio::task::spawn_blocking(move || file.update(f))
            .await
            .map_err(|e| FmsError::internal(format!("Failed to join task: {}", e)))??;

        *cache = Some(written);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for TomlCredentialStore {
    async fn load(&self) -> Result<LocalState> {
        let mut cache = self.cache.lock().await;
        if let Some(state) = cache.as_ref() {
            return Ok(state.clone());
        }

        let file = self.file.clone();
        let loaded = tokio::task::spawn_blocking(move || match file.load() {
            Err(AtomicTomlError::Parse(e)) => {
                // The next write replaces the document.
                tracing::warn!("[CredentialStore] Ignoring unreadable state file: {}", e);
                Ok(None)
            }
            other => other,
        })
        .await
        .map_err(|e| FmsError::internal(format!("Failed to join task: {}", e)))??
        .unwrap_or_default();

        tracing::debug!(
            "[CredentialStore] Loaded state from {:?} (session: {})",
            self.file.path(),
            loaded.session.is_some()
        );

        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let session = session.clone();
        self.mutate(move |state| state.session = Some(session)).await
    }

    async fn clear_session(&self) -> Result<()> {
        self.mutate(|state| state.session = None).await
    }

    async fn set_last_view(&self, view: ViewId) -> Result<()> {
        self.mutate(move |state| state.last_view = view).await
    }

    async fn set_display_preference(&self, preference: DisplayPreference) -> Result<()> {
        self.mutate(move |state| state.display_preference = preference)
            .await
    }
}

/// Process-local credential store.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    state: Arc<Mutex<LocalState>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `state`, as if restored from disk.
    pub fn with_state(state: LocalState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<LocalState> {
        Ok(self.state.lock().await.clone())
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        self.state.lock().await.session = Some(session.clone());
        Ok(())
    }

    async fn clear_session(&self) -> Result<()> {
        self.state.lock().await.session = None;
        Ok(())
    }

    async fn set_last_view(&self, view: ViewId) -> Result<()> {
        self.state.lock().await.last_view = view;
        Ok(())
    }

    async fn set_display_preference(&self, preference: DisplayPreference) -> Result<()> {
        self.state.lock().await.display_preference = preference;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fms_core::session::{Identity, IssuedCredential};
    use tempfile::TempDir;

    fn session() -> Session {
        Session::from_issued(
            IssuedCredential {
                id_token: "token-1".into(),
                refresh_token: Some("refresh-1".into()),
                uid: "uid-1".into(),
                email: "asha@example.com".into(),
                expires_in: Some(std::time::Duration::from_secs(3600)),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_empty_store_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = TomlCredentialStore::with_path(dir.path().join("state.toml"));

        let state = store.load().await.unwrap();
        assert_eq!(state, LocalState::default());
        assert_eq!(state.last_view, ViewId::Landing);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        let saved = session();

        {
            let store = TomlCredentialStore::with_path(path.clone());
            store.save_session(&saved).await.unwrap();
            store.set_last_view(ViewId::Scholarships).await.unwrap();
            store
                .set_display_preference(DisplayPreference::Dark)
                .await
                .unwrap();
        }

        let reopened = TomlCredentialStore::with_path(path);
        let state = reopened.load().await.unwrap();
        assert_eq!(state.session, Some(saved));
        assert_eq!(state.last_view, ViewId::Scholarships);
        assert_eq!(state.display_preference, DisplayPreference::Dark);
    }

    #[tokio::test]
    async fn test_clear_session_keeps_preferences() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        let store = TomlCredentialStore::with_path(path.clone());

        store.save_session(&session()).await.unwrap();
        store
            .set_display_preference(DisplayPreference::Dark)
            .await
            .unwrap();
        store.clear_session().await.unwrap();
        // Clearing twice is fine
        store.clear_session().await.unwrap();

        let state = TomlCredentialStore::with_path(path).load().await.unwrap();
        assert!(state.session.is_none());
        assert_eq!(state.display_preference, DisplayPreference::Dark);
    }

    #[tokio::test]
    async fn test_corrupt_state_file_is_recoverable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        std::fs::write(&path, "last_view = [not toml").unwrap();
        let store = TomlCredentialStore::with_path(path.clone());

        assert_eq!(store.load().await.unwrap(), LocalState::default());

        let saved = session();
        store.save_session(&saved).await.unwrap();

        let state = TomlCredentialStore::with_path(path).load().await.unwrap();
        assert_eq!(state.session, Some(saved));
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryCredentialStore::new();
        store.save_session(&session()).await.unwrap();
        let state = store.load().await.unwrap();
        assert_eq!(
            state.session.map(|s| s.identity),
            Some(Identity {
                uid: "uid-1".into(),
                email: "asha@example.com".into()
            })
        );
    }
}
