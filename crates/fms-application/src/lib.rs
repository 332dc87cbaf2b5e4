//! Use cases of the FundMyStudy client.
//!
//! The session context owns the credential and the session epoch; the
//! synchronizers reach the backend through it and apply results only when
//! their request is still the newest of the current epoch.

pub mod context;
pub mod eligibility;
pub mod navigator;
pub mod profile_sync;
pub mod reminders;
pub mod request;
pub mod session;

pub use context::ClientContext;
pub use eligibility::EligibilityFetcher;
pub use navigator::{Navigator, SessionTransition};
pub use profile_sync::ProfileSynchronizer;
pub use reminders::ReminderManager;
pub use request::{CancellationScope, RequestSequencer, RequestTicket};
pub use session::{AuthTicket, SessionContext, SessionManager, SessionScoped, SignUpOutcome};
