//! Deadline reminder subscriptions.
//!
//! At most one active reminder exists per (identity, scholarship). Subscribe
//! reconciles against the remote list before dispatching and guards against
//! concurrent duplicate requests for the same scholarship.

use async_trait::async_trait;
use fms_core::backend::ScholarshipBackend;
use fms_core::error::{FmsError, Result};
use fms_core::reminder::Reminder;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::eligibility::EligibilityFetcher;
use crate::request::{
    CancellationScope, RequestSequencer, RequestTicket, run_bounded, settle_error,
};
use crate::session::{AuthTicket, SessionContext, SessionScoped};

const UNKNOWN_DEADLINE: &str = "Not specified";

#[derive(Debug, Clone, Default)]
struct ReminderState {
    epoch: u64,
    reminders: Vec<Reminder>,
    last_email_status: Option<String>,
}

/// In-flight subscriptions, keyed by (session epoch, scholarship id).
type InFlightSet = Mutex<HashSet<(u64, String)>>;

/// Removes its key from the in-flight set when dropped.
struct InFlight<'a> {
    set: &'a InFlightSet,
    key: (u64, String),
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a InFlightSet, epoch: u64, scholarship_id: &str) -> Option<Self> {
        let key = (epoch, scholarship_id.to_string());
        let inserted = set
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.clone());
        inserted.then_some(Self { set, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}

pub struct ReminderManager {
    ctx: Arc<SessionContext>,
    backend: Arc<dyn ScholarshipBackend>,
    eligibility: Arc<EligibilityFetcher>,
    timeout: Duration,
    sequencer: RequestSequencer,
    scope: CancellationScope,
    state: RwLock<Option<ReminderState>>,
    in_flight: InFlightSet,
}

impl ReminderManager {
    pub fn new(
        ctx: Arc<SessionContext>,
        backend: Arc<dyn ScholarshipBackend>,
        eligibility: Arc<EligibilityFetcher>,
        timeout: Duration,
    ) -> Arc<Self> {
        let this = Arc::new(Self {
            ctx: ctx.clone(),
            backend,
            eligibility,
            timeout,
            sequencer: RequestSequencer::new(),
            scope: CancellationScope::new(),
            state: RwLock::new(None),
            in_flight: Mutex::new(HashSet::new()),
        });
        let weak: Weak<dyn SessionScoped> = Arc::downgrade(&this) as Weak<Self>;
        ctx.register(weak);
        this
    }

    /// Lists the active reminders of the signed-in identity.
    pub async fn list_active(&self) -> Result<Vec<Reminder>> {
        let auth = self.ctx.authorize().await?;
        self.list_with(&auth).await
    }

    async fn list_with(&self, auth: &AuthTicket) -> Result<Vec<Reminder>> {
        let ticket = self.sequencer.issue(auth.epoch);

        let result = run_bounded(
            self.backend.list_reminders(&auth.token),
            self.timeout,
            self.scope.token(),
        )
        .await;

        let reminders: Vec<Reminder> = match result {
            Ok(list) => list.into_iter().filter(Reminder::is_active).collect(),
            Err(e) => {
                let superseded = !self.sequencer.is_latest(&ticket);
                return Err(settle_error(&self.ctx, ticket.epoch, superseded, e).await);
            }
        };

        self.apply_list(&ticket, reminders).await
    }

    async fn apply_list(
        &self,
        ticket: &RequestTicket,
        reminders: Vec<Reminder>,
    ) -> Result<Vec<Reminder>> {
        let mut state = self.state.write().await;
        if self.ctx.epoch() != ticket.epoch {
            return Err(FmsError::SessionChanged);
        }
        if !self.sequencer.is_latest(ticket) {
            return Err(FmsError::Superseded);
        }

        let last_email_status = state
            .as_ref()
            .filter(|s| s.epoch == ticket.epoch)
            .and_then(|s| s.last_email_status.clone());
        *state = Some(ReminderState {
            epoch: ticket.epoch,
            reminders: reminders.clone(),
            last_email_status,
        });
        Ok(reminders)
    }

    /// Subscribes to the deadline reminder for `scholarship_id`.
    ///
    /// Reports `AlreadySubscribed` when an active reminder exists or the same
    /// subscription is already in flight; never creates a duplicate.
    pub async fn subscribe(&self, scholarship_id: &str) -> Result<Reminder> {
        let scholarship_id = scholarship_id.trim();
        if scholarship_id.is_empty() {
            return Err(FmsError::validation("scholarshipId", "is required"));
        }

        let auth = self.ctx.authorize().await?;

        let Some(_in_flight) = InFlight::acquire(&self.in_flight, auth.epoch, scholarship_id) else {
            tracing::debug!(
                "[Reminders] Subscribe for {} already in flight",
                scholarship_id
            );
            return Err(FmsError::AlreadySubscribed {
                scholarship_id: scholarship_id.to_string(),
                existing: None,
            });
        };

        let known = match self.snapshot_for(auth.epoch).await {
            Some(reminders) => reminders,
            None => match self.list_with(&auth).await {
                Ok(reminders) => reminders,
                Err(FmsError::Superseded) => {
                    self.snapshot_for(auth.epoch).await.unwrap_or_default()
                }
                Err(e) => return Err(e),
            },
        };
        if let Some(existing) = known.into_iter().find(|r| r.scholarship_id == scholarship_id) {
            return Err(FmsError::AlreadySubscribed {
                scholarship_id: scholarship_id.to_string(),
                existing: Some(Box::new(existing)),
            });
        }

        let receipt = match run_bounded(
            self.backend.subscribe_reminder(&auth.token, scholarship_id),
            self.timeout,
            self.scope.token(),
        )
        .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                let settled = settle_error(&self.ctx, auth.epoch, false, e).await;
                if !settled.is_discarded() {
                    tracing::warn!(
                        "[Reminders] Subscribe for {} failed: {}",
                        scholarship_id,
                        settled
                    );
                }
                return Err(settled);
            }
        };

        tracing::info!(
            "[Reminders] Subscribed to {} (email status: {})",
            scholarship_id,
            receipt.email_status.as_deref().unwrap_or("unknown")
        );
        self.record_email_status(auth.epoch, receipt.email_status)
            .await;

        let confirmed = match self.list_with(&auth).await {
            Ok(reminders) => reminders
                .into_iter()
                .find(|r| r.scholarship_id == scholarship_id),
            Err(e) if e == FmsError::SessionChanged => return Err(e),
            Err(e) => {
                tracing::debug!("[Reminders] Re-list after subscribe failed: {}", e);
                None
            }
        };

        let reminder = match confirmed {
            Some(reminder) => reminder,
            None => {
                let reminder = self.local_reminder(scholarship_id).await;
                self.insert_local(auth.epoch, reminder.clone()).await;
                reminder
            }
        };
        Ok(reminder)
    }

    /// True when the last known list holds an active reminder for `scholarship_id`.
    ///
    /// Purely local; never touches the network.
    pub async fn is_subscribed(&self, scholarship_id: &str) -> bool {
        self.snapshot_for(self.ctx.epoch())
            .await
            .is_some_and(|list| list.iter().any(|r| r.scholarship_id == scholarship_id))
    }

    /// Last known active reminders of the current session.
    pub async fn cached(&self) -> Option<Vec<Reminder>> {
        self.snapshot_for(self.ctx.epoch()).await
    }

    /// Confirmation e-mail status reported by the last successful subscribe.
    pub async fn last_email_status(&self) -> Option<String> {
        let epoch = self.ctx.epoch();
        self.state
            .read()
            .await
            .as_ref()
            .filter(|s| s.epoch == epoch)
            .and_then(|s| s.last_email_status.clone())
    }

    pub fn cancel_pending(&self) {
        self.scope.cancel_all();
    }

    async fn snapshot_for(&self, epoch: u64) -> Option<Vec<Reminder>> {
        self.state
            .read()
            .await
            .as_ref()
            .filter(|s| s.epoch == epoch)
            .map(|s| s.reminders.clone())
    }

    async fn record_email_status(&self, epoch: u64, status: Option<String>) {
        let mut state = self.state.write().await;
        if self.ctx.epoch() != epoch {
            return;
        }
        match state.as_mut().filter(|s| s.epoch == epoch) {
            Some(s) => s.last_email_status = status,
            None => {
                *state = Some(ReminderState {
                    epoch,
                    reminders: Vec::new(),
                    last_email_status: status,
                })
            }
        }
    }

    async fn insert_local(&self, epoch: u64, reminder: Reminder) {
        let mut state = self.state.write().await;
        if self.ctx.epoch() != epoch {
            return;
        }
        if let Some(s) = state.as_mut().filter(|s| s.epoch == epoch)
            && !s
                .reminders
                .iter()
                .any(|r| r.scholarship_id == reminder.scholarship_id)
        {
            s.reminders.push(reminder);
        }
    }

    /// Builds the reminder from the last known scholarship list when the
    /// backend list could not be re-read.
    async fn local_reminder(&self, scholarship_id: &str) -> Reminder {
        let email = self
            .ctx
            .current_identity()
            .map(|identity| identity.email)
            .unwrap_or_default();

        match self
            .eligibility
            .snapshot()
            .await
            .as_ref()
            .and_then(|snapshot| snapshot.find(scholarship_id))
        {
            Some(scholarship) => Reminder::for_scholarship(scholarship, email),
            None => Reminder {
                scholarship_id: scholarship_id.to_string(),
                scholarship_name: scholarship_id.to_string(),
                deadline: UNKNOWN_DEADLINE.to_string(),
                notify_email: email,
                status: Some("active".to_string()),
            },
        }
    }
}

#[async_trait]
impl SessionScoped for ReminderManager {
    async fn invalidate(&self) {
        self.state.write().await.take();
    }
}
