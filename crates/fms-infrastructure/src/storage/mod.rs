//! Storage layer for atomic local file operations.

mod atomic_toml;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
