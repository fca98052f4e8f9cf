//! Publish workflow use case - load a folder, publish the blog post, then share it

use std::sync::Arc;

use crate::{
    model::{BlogOutcome, Content, SnsOutcome, SnsResult, WorkflowReport},
    ports::{BlogTarget, ContentRepo, LoadError, PublishError, Publisher},
    registry::PublisherRegistry,
};

/// Options for a single workflow run
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowOptions {
    /// Format and validate, but touch nothing remote
    pub dry_run: bool,
    pub skip_blog: bool,
    pub skip_sns: bool,
}

/// Errors that abort the whole workflow
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Failed to load content: {0}")]
    Load(#[from] LoadError),
}

/// Orchestrates load -> blog -> social platforms -> summary
pub struct PublishWorkflow<R>
where
    R: ContentRepo + ?Sized,
{
    content_repo: Arc<R>,
    blog: Box<dyn BlogTarget>,
    publishers: PublisherRegistry,
}

impl<R> PublishWorkflow<R>
where
    R: ContentRepo + ?Sized,
{
    pub fn new(
        content_repo: Arc<R>,
        blog: Box<dyn BlogTarget>,
        publishers: PublisherRegistry,
    ) -> Self {
        Self {
            content_repo,
            blog,
            publishers,
        }
    }

    /// Publish everything in `folder`. Only a load failure is an error;
    /// per-target failures are recorded in the report.
    pub async fn publish_from_folder(
        &mut self,
        folder: &str,
        options: WorkflowOptions,
    ) -> Result<WorkflowReport, WorkflowError> {
        let bundle = self.content_repo.load_folder(folder).await?;

        tracing::info!(
            folder = %folder,
            title = bundle.blog_content.title.as_deref().unwrap_or_default(),
            images = bundle.blog_content.image_paths.len(),
            platforms = ?bundle.platforms,
            "Loaded content folder"
        );

        let blog = if options.skip_blog {
            tracing::info!("Skipping blog phase");
            BlogOutcome::Skipped
        } else {
            self.run_blog_phase(&bundle.blog_content, options.dry_run)
                .await
        };

        // Never share a link to a post that failed to publish
        if let BlogOutcome::Failed { error } = &blog {
            tracing::error!(error = %error, "Blog publish failed, skipping social platforms");
            return Ok(WorkflowReport { blog, sns: vec![] });
        }

        let sns = if options.skip_sns {
            tracing::info!("Skipping social phase");
            vec![]
        } else if bundle.sns_text.trim().is_empty() {
            tracing::info!("No social text in metadata, nothing to share");
            vec![]
        } else {
            let text = match blog.url() {
                Some(url) => format!("{}\n\n🔗 {}", bundle.sns_text, url),
                None => bundle.sns_text.clone(),
            };
            // An empty list targets every configured platform
            let platforms = if bundle.platforms.is_empty() {
                self.publishers
                    .platforms()
                    .into_iter()
                    .map(String::from)
                    .collect()
            } else {
                bundle.platforms.clone()
            };
            let content = Content::social(text).with_platforms(platforms.clone());
            self.run_sns_phase(&content, &platforms, options.dry_run)
                .await
        };

        let report = WorkflowReport { blog, sns };
        let summary = report.summary();
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Workflow complete"
        );

        Ok(report)
    }

    async fn run_blog_phase(&mut self, content: &Content, dry_run: bool) -> BlogOutcome {
        if dry_run {
            let url = self.blog.post_url(content);
            tracing::info!(url = %url, "[DRY RUN] Would publish blog post");
            return BlogOutcome::DryRun { url };
        }

        match attempt(self.blog.as_mut(), content).await {
            Ok(result) => {
                tracing::info!(url = %result.url, "Published blog post");
                BlogOutcome::Published(result)
            }
            Err(e) => BlogOutcome::Failed {
                error: e.to_string(),
            },
        }
    }

    async fn run_sns_phase(
        &mut self,
        content: &Content,
        platforms: &[String],
        dry_run: bool,
    ) -> Vec<SnsResult> {
        let mut results = Vec::with_capacity(platforms.len());

        for platform in platforms {
            let Some(publisher) = self.publishers.get_mut(platform) else {
                tracing::warn!(platform = %platform, "Platform not configured, skipping");
                results.push(SnsResult {
                    platform: platform.clone(),
                    outcome: SnsOutcome::NotConfigured,
                });
                continue;
            };

            let outcome = if dry_run {
                match publisher.format_content(content) {
                    Ok(formatted) => {
                        tracing::info!(platform = %platform, "[DRY RUN] Would publish");
                        SnsOutcome::DryRun {
                            preview: formatted.as_text().to_string(),
                        }
                    }
                    Err(e) => SnsOutcome::Failed {
                        error: e.to_string(),
                    },
                }
            } else {
                match attempt(publisher, content).await {
                    Ok(result) => {
                        tracing::info!(platform = %platform, url = %result.url, "Published");
                        SnsOutcome::Published(result)
                    }
                    Err(e) => {
                        tracing::error!(platform = %platform, error = %e, "Failed to publish");
                        SnsOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            results.push(SnsResult {
                platform: platform.clone(),
                outcome,
            });
        }

        results
    }
}

/// authenticate -> validate -> publish on one target
pub async fn attempt<P>(
    publisher: &mut P,
    content: &Content,
) -> Result<crate::model::PublishResult, PublishError>
where
    P: Publisher + ?Sized,
{
    publisher.authenticate().await?;
    publisher.validate(content)?;
    publisher.publish(content).await
}
