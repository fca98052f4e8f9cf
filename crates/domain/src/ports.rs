//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Content, FolderBundle, FormattedContent, PublishResult};

/// Error type for publisher operations
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Remote error: {0}")]
    Remote(String),
    #[error("Not implemented: {0}")]
    Unimplemented(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Four-step contract every publishing target follows, in order:
/// authenticate, validate, format, publish
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Platform key (e.g., "x", "threads", "blog")
    fn platform(&self) -> &str;

    /// Establish or verify credentials
    async fn authenticate(&mut self) -> Result<(), PublishError>;

    /// Local precondition checks; the first violated rule is reported
    fn validate(&self, content: &Content) -> Result<(), PublishError>;

    /// Build the platform-specific payload
    fn format_content(&self, content: &Content) -> Result<FormattedContent, PublishError>;

    /// Perform the remote side effect
    async fn publish(&self, content: &Content) -> Result<PublishResult, PublishError>;
}

/// A blog target: a publisher that also knows its URLs and how to deploy
#[async_trait]
pub trait BlogTarget: Publisher {
    /// URL the post will be served at
    fn post_url(&self, content: &Content) -> String;

    /// Push committed changes to the remote
    async fn deploy(&self) -> Result<(), PublishError>;
}

/// Error type for content loading
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for loading content folders
#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Load `{name}/content.md`, `{name}/meta.md` and `{name}/assets/*`
    async fn load_folder(&self, name: &str) -> Result<FolderBundle, LoadError>;

    /// Immediate, non-hidden subdirectories of the content root
    async fn list_folders(&self) -> Result<Vec<String>, LoadError>;
}

/// Error type for version control operations
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a commit attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    NothingToCommit,
}

/// Port for the blog repository's version control
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Check that commits can be authored
    async fn ensure_identity(&self) -> Result<(), VcsError>;

    async fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError>;

    /// Commit staged changes; an empty commit is reported, not failed
    async fn commit(&self, message: &str) -> Result<CommitOutcome, VcsError>;

    async fn push(&self) -> Result<(), VcsError>;
}

/// Error type for object storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Remote(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for remote object storage used to rehost images
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload a local file under `key`, returning its public URL
    async fn upload(&self, file_path: &Path, key: &str) -> Result<String, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
}

/// Error type for translation
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Translation command failed: {0}")]
    Command(String),
    #[error("Translation timed out after {0}s")]
    Timeout(u64),
    #[error("Translation returned no text")]
    EmptyOutput,
}

/// Port for text translation
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError>;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
