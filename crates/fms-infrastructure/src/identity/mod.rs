//! Identity provider adapters.

mod firebase;

pub use firebase::{FirebaseIdentityProvider, map_error_code};
