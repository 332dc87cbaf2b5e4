//! Request sequencing and cancellation shared by the synchronizers.
//!
//! Every call to a logical resource takes a [`RequestTicket`] from that
//! resource's [`RequestSequencer`]. When the response arrives, the ticket
//! decides whether the result may be applied: only the most recently issued
//! ticket of the current session epoch wins.

use fms_core::error::{FmsError, Result};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::session::SessionContext;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub epoch: u64,
}

/// Monotonic per-resource request counter.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket that supersedes every earlier one.
    pub fn issue(&self, epoch: u64) -> RequestTicket {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket { seq, epoch }
    }

    pub fn is_latest(&self, ticket: &RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.seq
    }
}

/// Cancellation scope for the in-flight requests of one component.
///
/// `cancel_all` cancels everything issued so far and arms a fresh token so
/// later requests are unaffected.
#[derive(Debug, Default)]
pub struct CancellationScope {
    current: Mutex<CancellationToken>,
}

impl CancellationScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .child_token()
    }

    pub fn cancel_all(&self) {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.cancel();
        *current = CancellationToken::new();
    }
}

/// Runs `future` bounded by `ceiling` and `cancel`.
///
/// Cancellation wins over completion when both are ready.
pub async fn run_bounded<F, T>(future: F, ceiling: Duration, cancel: CancellationToken) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FmsError::Cancelled),
        outcome = tokio::time::timeout(ceiling, future) => match outcome {
            Ok(result) => result,
            Err(_) => Err(FmsError::Timeout { after: ceiling }),
        },
    }
}

/// Classifies a failed request of session `epoch`.
///
/// Results from a replaced session become `SessionChanged`. An expired
/// credential is reported to the session context before being returned.
/// Failures of requests that were overtaken by a newer one become
/// `Superseded` so they never reach the UI.
pub(crate) async fn settle_error(
    ctx: &SessionContext,
    epoch: u64,
    superseded: bool,
    err: FmsError,
) -> FmsError {
    if ctx.epoch() != epoch {
        return FmsError::SessionChanged;
    }
    match err {
        FmsError::SessionExpired => {
            ctx.report_expired(epoch).await;
            FmsError::SessionExpired
        }
        FmsError::Cancelled => FmsError::Cancelled,
        _ if superseded => FmsError::Superseded,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_ticket_wins() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.issue(1);
        let second = sequencer.issue(1);

        assert!(second.seq > first.seq);
        assert!(!sequencer.is_latest(&first));
        assert!(sequencer.is_latest(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_bounded_times_out() {
        let result: Result<()> = run_bounded(
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            },
            Duration::from_secs(10),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(
            result.unwrap_err(),
            FmsError::Timeout {
                after: Duration::from_secs(10)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_resolves_pending_and_rearms() {
        let scope = CancellationScope::new();
        let token = scope.token();

        let pending = tokio::spawn(run_bounded(
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(1)
            },
            Duration::from_secs(30),
            token,
        ));
        tokio::task::yield_now().await;
        scope.cancel_all();

        assert_eq!(pending.await.unwrap().unwrap_err(), FmsError::Cancelled);

        let after = run_bounded(async { Ok(2) }, Duration::from_secs(30), scope.token()).await;
        assert_eq!(after.unwrap(), 2);
    }
}
