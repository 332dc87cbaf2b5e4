//! Scholarship domain: scored results and the labeled demo dataset.

mod demo;
mod model;

pub use demo::demo_scholarships;
pub use model::{DataSource, EligibilitySnapshot, Scholarship};
pub(crate) use model::parse_deadline;
