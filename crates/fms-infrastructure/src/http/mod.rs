//! HTTP adapter for the FundMyStudy backend.

mod backend;
pub mod classify;

pub use backend::HttpBackend;
