//! X (Twitter) API adapters

mod write;

pub use write::{X_API_BASE, XPublisher};
