//! Student profile domain.

mod draft;
mod model;

pub use draft::ProfileDraft;
pub use model::{CasteCategory, MinorityStatus, Profile, ProfileCompleteness};
