//! indieshout adapters crate
//!
//! Infrastructure adapters implementing the domain ports:
//! - `content`: Filesystem content folders and single markdown posts
//! - `blog`: Hugo static-site publisher
//! - `git`: Git CLI version control
//! - `translate`: Translation through a local CLI command
//! - `storage`: S3 image storage
//! - `x_api`, `threads`: Social platform publishers

mod content_fs;

pub mod blog;
pub mod git;
pub mod storage;
pub mod threads;
pub mod translate;
pub mod x_api;

/// Re-exports for content adapters
pub mod content {
    pub use crate::content_fs::FsContentRepo;
}

use reqwest::Client;
use std::time::Duration;

pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client settings for the platform adapters
pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}
