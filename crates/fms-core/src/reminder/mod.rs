//! Deadline reminder domain.

mod model;

pub use model::{Reminder, SubscribeReceipt};
