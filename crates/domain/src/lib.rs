//! indieshout domain crate
//!
//! Core publishing logic, independent of any platform SDK:
//! - `model`: Content, publish results and workflow reports
//! - `ports`: Traits the adapters implement (publishers, storage, git, translation)
//! - `registry`: Platform-keyed publisher lookup
//! - `formatter`: Per-platform length rules
//! - `validation`, `slug`, `front_matter`: Shared helpers for publishers
//! - `usecases`: The folder publish workflow and markdown translation

pub mod formatter;
pub mod front_matter;
pub mod model;
pub mod ports;
pub mod registry;
pub mod slug;
pub mod usecases;
pub mod validation;

pub use model::*;
pub use ports::*;
pub use registry::PublisherRegistry;
