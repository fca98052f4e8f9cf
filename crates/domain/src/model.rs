//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use time::OffsetDateTime;

/// What a piece of content is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Long-form post for the static-site blog
    Blog,
    /// Short post for social platforms
    #[default]
    Social,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Blog => "blog",
            ContentKind::Social => "sns",
        }
    }
}

/// One logical post, consumed once per publish attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    pub kind: ContentKind,
    /// Body text; must be non-empty after trimming when published
    pub text: String,
    /// Required only for blog publishing
    pub title: Option<String>,
    /// Images in publication order
    #[serde(default)]
    pub image_paths: Vec<PathBuf>,
    /// Not consumed by any publisher yet
    pub video_path: Option<PathBuf>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Target platform keys; empty means every configured platform
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Derived from title and date when absent
    pub slug: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    /// Carried through but never scheduled
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_at: Option<OffsetDateTime>,
}

impl Content {
    /// Create social content from literal text
    pub fn social(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Social,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create blog content with a title
    pub fn blog(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Blog,
            text: text.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_images<I, P>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.image_paths = images.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the text is blank after trimming
    pub fn has_blank_text(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Platforms used when `meta.md` does not list any
pub const DEFAULT_PLATFORMS: [&str; 2] = ["x", "threads"];

/// Everything loaded from one content folder
#[derive(Debug, Clone)]
pub struct FolderBundle {
    /// Blog-kind content built from `content.md` and the metadata header
    pub blog_content: Content,
    /// Free text after the `---` separator in `meta.md`
    pub sns_text: String,
    /// Platforms declared in metadata, or the defaults
    pub platforms: Vec<String>,
    /// Unrecognized metadata keys, passed through verbatim
    pub extra: BTreeMap<String, String>,
}

/// Payload produced by a publisher's format step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedContent {
    /// Platform-ready post text
    Text(String),
    /// Markdown document with front matter, plus the slug it will live under
    Markdown { markdown: String, slug: String },
}

impl FormattedContent {
    pub fn as_text(&self) -> &str {
        match self {
            FormattedContent::Text(text) => text,
            FormattedContent::Markdown { markdown, .. } => markdown,
        }
    }
}

/// Files written by a blog publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogFiles {
    /// Default-language file
    pub primary: PathBuf,
    /// Translated copies keyed by language code
    #[serde(default)]
    pub translations: BTreeMap<String, PathBuf>,
}

/// Blog-specific part of a publish result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogArtifacts {
    pub slug: String,
    pub files: BlogFiles,
    /// Local image path -> remote URL, for images that were uploaded
    #[serde(default)]
    pub images: BTreeMap<String, String>,
}

/// Result of a successful publish on any target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    /// Canonical URL of the published content
    pub url: String,
    /// Platform-assigned identifier, if the platform returns one
    pub id: Option<String>,
    /// Present for blog targets only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog: Option<BlogArtifacts>,
}

/// Outcome of the workflow's blog phase
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlogOutcome {
    Published(PublishResult),
    DryRun { url: String },
    Skipped,
    Failed { error: String },
}

impl BlogOutcome {
    /// URL to share on social platforms, if the phase produced one
    pub fn url(&self) -> Option<&str> {
        match self {
            BlogOutcome::Published(result) => Some(&result.url),
            BlogOutcome::DryRun { url } => Some(url),
            BlogOutcome::Skipped | BlogOutcome::Failed { .. } => None,
        }
    }
}

/// Outcome for a single social platform
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SnsOutcome {
    Published(PublishResult),
    DryRun { preview: String },
    NotConfigured,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SnsResult {
    pub platform: String,
    #[serde(flatten)]
    pub outcome: SnsOutcome,
}

/// Aggregate counts over every target in a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Final result of a folder publish
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub blog: BlogOutcome,
    pub sns: Vec<SnsResult>,
}

impl WorkflowReport {
    pub fn summary(&self) -> WorkflowSummary {
        let mut summary = WorkflowSummary::default();

        match self.blog {
            BlogOutcome::Published(_) | BlogOutcome::DryRun { .. } => summary.succeeded += 1,
            BlogOutcome::Skipped => summary.skipped += 1,
            BlogOutcome::Failed { .. } => summary.failed += 1,
        }

        for result in &self.sns {
            match result.outcome {
                SnsOutcome::Published(_) | SnsOutcome::DryRun { .. } => summary.succeeded += 1,
                SnsOutcome::NotConfigured => summary.skipped += 1,
                SnsOutcome::Failed { .. } => summary.failed += 1,
            }
        }

        summary
    }

    /// True when no target failed
    pub fn is_success(&self) -> bool {
        self.summary().failed == 0
    }
}
