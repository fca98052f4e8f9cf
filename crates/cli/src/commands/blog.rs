//! Blog command - preview, publish, list and deploy posts

use anyhow::{Context, Result, bail};
use indieshout_domain::usecases::{PublishWorkflow, WorkflowOptions};
use indieshout_domain::{
    BlogOutcome, BlogTarget, ContentRepo, DEFAULT_PLATFORMS, FormattedContent, Publisher,
    SnsOutcome, WorkflowReport,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::args::{BlogArgs, BlogCommands, PublishFolderArgs};
use crate::commands::publishers;
use crate::config::AppConfig;

pub async fn execute(args: BlogArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    match args.command {
        BlogCommands::Publish { file, platforms } => preview_file(&config, &file, platforms).await,
        BlogCommands::PublishFolder(args) => publish_folder(&config, args).await,
        BlogCommands::List { content_dir } => list_folders(&config, content_dir).await,
        BlogCommands::Deploy => deploy(&config).await,
    }
}

/// Dry-run preview of a single markdown file; nothing is written or posted
async fn preview_file(config: &AppConfig, file: &Path, platforms: Vec<String>) -> Result<()> {
    let repo = publishers::build_content_repo(config, None);
    let content = repo
        .read_post(file)
        .with_context(|| format!("Failed to read post: {}", file.display()))?;

    let blog = publishers::build_blog(config).await?;
    let formatted = blog
        .format_content(&content)
        .context("Failed to format blog post")?;

    let platforms = if platforms.is_empty() {
        DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect()
    } else {
        platforms
    };

    tracing::info!(file = %file.display(), platforms = ?platforms, "Previewing post");

    println!("[dry-run] Nothing will be published");
    println!();
    println!("=== blog ===");
    println!("URL: {}", blog.post_url(&content));
    if let FormattedContent::Markdown { slug, .. } = &formatted {
        println!("Slug: {}", slug);
    }
    println!();
    println!("{}", formatted.as_text());

    let formatter = publishers::formatter();
    for platform in &platforms {
        println!();
        println!("=== {} ===", platform);
        println!("{}", formatter.format_for_platform(&content, platform));
    }

    Ok(())
}

async fn publish_folder(config: &AppConfig, args: PublishFolderArgs) -> Result<()> {
    let repo = Arc::new(publishers::build_content_repo(config, args.content_dir));
    let blog = publishers::build_blog(config).await?;
    let registry = publishers::build_registry(config, &publishers::formatter());

    let options = WorkflowOptions {
        dry_run: args.dry_run,
        skip_blog: args.skip_blog,
        skip_sns: args.skip_sns,
    };

    tracing::info!(
        folder = %args.name,
        dry_run = options.dry_run,
        skip_blog = options.skip_blog,
        skip_sns = options.skip_sns,
        "Publishing content folder"
    );

    let mut workflow = PublishWorkflow::new(repo, Box::new(blog), registry);
    let report = workflow.publish_from_folder(&args.name, options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, options.dry_run);
    }

    let summary = report.summary();
    if !report.is_success() {
        bail!("{} target(s) failed to publish", summary.failed);
    }

    Ok(())
}

fn print_report(report: &WorkflowReport, dry_run: bool) {
    if dry_run {
        println!("[dry-run] Nothing was published");
        println!();
    }

    match &report.blog {
        BlogOutcome::Published(result) => println!("✓ blog: {}", result.url),
        BlogOutcome::DryRun { url } => println!("✓ blog: would publish to {}", url),
        BlogOutcome::Skipped => println!("- blog: skipped"),
        BlogOutcome::Failed { error } => println!("✗ blog: {}", error),
    }

    for result in &report.sns {
        match &result.outcome {
            SnsOutcome::Published(published) => {
                println!("✓ {}: {}", result.platform, published.url)
            }
            SnsOutcome::DryRun { preview } => {
                println!("✓ {}: would post", result.platform);
                for line in preview.lines() {
                    println!("    {}", line);
                }
            }
            SnsOutcome::NotConfigured => println!("- {}: not configured", result.platform),
            SnsOutcome::Failed { error } => println!("✗ {}: {}", result.platform, error),
        }
    }

    let summary = report.summary();
    println!();
    println!(
        "Summary: {} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );
}

async fn list_folders(config: &AppConfig, content_dir: Option<PathBuf>) -> Result<()> {
    let repo = publishers::build_content_repo(config, content_dir);
    let folders = repo
        .list_folders()
        .await
        .context("Failed to list content folders")?;

    if folders.is_empty() {
        println!("No content folders in {}", repo.root().display());
        return Ok(());
    }

    for folder in folders {
        println!("{}", folder);
    }

    Ok(())
}

async fn deploy(config: &AppConfig) -> Result<()> {
    let blog = publishers::build_blog(config).await?;
    blog.deploy().await.context("Failed to deploy blog")?;

    println!("Deployed {}", blog.settings().repo_path.display());
    Ok(())
}
