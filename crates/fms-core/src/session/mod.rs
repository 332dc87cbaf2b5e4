//! Session domain: the persisted credential, the local state document and the
//! ports that produce and store credentials.

pub mod credentials;
pub mod identity;
pub mod model;
pub mod store;

pub use identity::{IdentityProvider, IssuedCredential};
pub use model::{AuthState, Identity, Session, SessionEvent};
pub use store::{CredentialStore, LocalState};
