//! Credential store port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::Session;
use crate::error::Result;
use crate::navigation::{DisplayPreference, ViewId};

/// Local state that survives a process restart.
///
/// Three independent key-value pairs: the session, the last resolved view
/// and the display preference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub last_view: ViewId,
    #[serde(default)]
    pub display_preference: DisplayPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

/// Durable, process-wide holder of the session and navigation preferences.
///
/// The session manager is the only writer of `session`; the navigator is the
/// only writer of `last_view` and `display_preference`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads the persisted state, or the default state when nothing is stored.
    async fn load(&self) -> Result<LocalState>;

    async fn save_session(&self, session: &Session) -> Result<()>;

    /// Removes the session. Succeeds when no session is stored.
    async fn clear_session(&self) -> Result<()>;

    async fn set_last_view(&self, view: ViewId) -> Result<()>;

    async fn set_display_preference(&self, preference: DisplayPreference) -> Result<()>;
}
