//! Session lifecycle: the shared context and the manager that drives it.

mod context;
mod manager;

pub use context::{AuthTicket, SessionContext, SessionScoped};
pub use manager::{SessionManager, SignUpOutcome};
