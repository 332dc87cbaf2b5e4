//! Eligibility fetching with last-request-wins semantics.
//!
//! The scored list is applied to the snapshot exactly as the backend ranked
//! it. The demo dataset is only ever produced by [`EligibilityFetcher::show_demo`].

use async_trait::async_trait;
use chrono::Utc;
use fms_core::backend::ScholarshipBackend;
use fms_core::error::{FmsError, Result};
use fms_core::profile::ProfileCompleteness;
use fms_core::scholarship::{DataSource, EligibilitySnapshot, Scholarship, demo_scholarships};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::profile_sync::ProfileSynchronizer;
use crate::request::{CancellationScope, RequestSequencer, run_bounded, settle_error};
use crate::session::{SessionContext, SessionScoped};

pub struct EligibilityFetcher {
    ctx: Arc<SessionContext>,
    backend: Arc<dyn ScholarshipBackend>,
    profiles: Arc<ProfileSynchronizer>,
    timeout: Duration,
    sequencer: RequestSequencer,
    scope: CancellationScope,
    snapshot: RwLock<Option<(u64, EligibilitySnapshot)>>,
}

impl EligibilityFetcher {
    pub fn new(
        ctx: Arc<SessionContext>,
        backend: Arc<dyn ScholarshipBackend>,
        profiles: Arc<ProfileSynchronizer>,
        timeout: Duration,
    ) -> Arc<Self> {
        let this = Arc::new(Self {
            ctx: ctx.clone(),
            backend,
            profiles,
            timeout,
            sequencer: RequestSequencer::new(),
            scope: CancellationScope::new(),
            snapshot: RwLock::new(None),
        });
        let weak: Weak<dyn SessionScoped> = Arc::downgrade(&this) as Weak<Self>;
        ctx.register(weak);
        this
    }

    /// Requests the scored scholarship list for the current profile.
    ///
    /// An empty list is a success. Only the most recently issued call of the
    /// current session is applied; older ones resolve to `Superseded` or
    /// `SessionChanged`.
    pub async fn fetch_eligible(&self) -> Result<Vec<Scholarship>> {
        let auth = self.ctx.authorize().await?;

        if self.profiles.completeness().await == ProfileCompleteness::Missing {
            tracing::debug!("[Eligibility] Profile missing, not querying backend");
            return Err(FmsError::ProfileIncomplete);
        }

        let ticket = self.sequencer.issue(auth.epoch);
        tracing::debug!("[Eligibility] Fetch #{} issued", ticket.seq);

        let result = run_bounded(
            self.backend.fetch_eligible(&auth.token),
            self.timeout,
            self.scope.token(),
        )
        .await;

        let scholarships = match result {
            Ok(list) => list,
            Err(e) => {
                let superseded = !self.sequencer.is_latest(&ticket);
                let settled = settle_error(&self.ctx, ticket.epoch, superseded, e).await;
                if !settled.is_discarded() {
                    tracing::warn!("[Eligibility] Fetch #{} failed: {}", ticket.seq, settled);
                }
                return Err(settled);
            }
        };

        let mut snapshot = self.snapshot.write().await;
        if self.ctx.epoch() != ticket.epoch {
            tracing::debug!("[Eligibility] Fetch #{} discarded: session changed", ticket.seq);
            return Err(FmsError::SessionChanged);
        }
        if !self.sequencer.is_latest(&ticket) {
            tracing::debug!("[Eligibility] Fetch #{} discarded: superseded", ticket.seq);
            return Err(FmsError::Superseded);
        }

        tracing::info!(
            "[Eligibility] Applied {} scholarships from fetch #{}",
            scholarships.len(),
            ticket.seq
        );
        *snapshot = Some((
            ticket.epoch,
            EligibilitySnapshot {
                source: DataSource::Live,
                scholarships: scholarships.clone(),
                fetched_at: Utc::now(),
            },
        ));
        Ok(scholarships)
    }

    /// Replaces the visible list with the labeled demo dataset.
    ///
    /// Counts as a new request, so any fetch still in flight is superseded.
    pub async fn show_demo(&self) -> EligibilitySnapshot {
        let mut snapshot = self.snapshot.write().await;
        let ticket = self.sequencer.issue(self.ctx.epoch());

        let demo = EligibilitySnapshot {
            source: DataSource::Demo,
            scholarships: demo_scholarships(),
            fetched_at: Utc::now(),
        };
        tracing::info!("[Eligibility] Showing demo data");
        *snapshot = Some((ticket.epoch, demo.clone()));
        demo
    }

    /// The last applied result of the current session.
    pub async fn snapshot(&self) -> Option<EligibilitySnapshot> {
        let epoch = self.ctx.epoch();
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|(e, _)| *e == epoch)
            .map(|(_, s)| s.clone())
    }

    /// Cancels every in-flight fetch.
    pub fn cancel_pending(&self) {
        tracing::debug!("[Eligibility] Cancelling pending fetches");
        self.scope.cancel_all();
    }
}

#[async_trait]
impl SessionScoped for EligibilityFetcher {
    async fn invalidate(&self) {
        self.snapshot.write().await.take();
    }
}
