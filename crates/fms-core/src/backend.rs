//! Backend port: the remote profile, eligibility and reminder collaborator.

use async_trait::async_trait;

use crate::error::Result;
use crate::profile::Profile;
use crate::reminder::{Reminder, SubscribeReceipt};
use crate::scholarship::Scholarship;

/// The remote backend reached with a bearer token.
///
/// Implementations classify failures by cause:
/// - authentication rejected -> `SessionExpired`
/// - expected absence -> `NotFound`
/// - missing profile on the eligibility query -> `ProfileIncomplete`
/// - no answer within the ceiling -> `Timeout`
/// - connection failure -> `Unreachable`
/// - anything else -> `ServerError`
#[async_trait]
pub trait ScholarshipBackend: Send + Sync {
    /// Upserts the profile of the token's identity.
    ///
    /// Returns the saved profile when the backend echoes it, `None` when it
    /// only acknowledges the write.
    async fn save_profile(&self, token: &str, profile: &Profile) -> Result<Option<Profile>>;

    /// Fetches the profile of the token's identity.
    async fn fetch_profile(&self, token: &str) -> Result<Profile>;

    /// Runs the eligibility query. Order is the backend's ranking.
    async fn fetch_eligible(&self, token: &str) -> Result<Vec<Scholarship>>;

    /// Lists reminders of the token's identity.
    async fn list_reminders(&self, token: &str) -> Result<Vec<Reminder>>;

    /// Requests a deadline reminder for `scholarship_id`.
    async fn subscribe_reminder(&self, token: &str, scholarship_id: &str)
    -> Result<SubscribeReceipt>;
}
