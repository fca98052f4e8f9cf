//! Sns command - post text straight to social platforms

use anyhow::Result;
use indieshout_domain::usecases::publish_workflow::attempt;
use indieshout_domain::{Content, DEFAULT_PLATFORMS};
use std::path::PathBuf;

use crate::args::{SnsArgs, SnsCommands, SnsPostArgs};
use crate::commands::publishers;
use crate::config::AppConfig;

/// Per-target counts printed after a live post
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    posted: usize,
    failed: usize,
    skipped: usize,
}

pub async fn execute(args: SnsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    match args.command {
        SnsCommands::Post(args) => post(&config, args).await,
    }
}

async fn post(config: &AppConfig, args: SnsPostArgs) -> Result<()> {
    let dry_run = args.is_dry_run();
    let content = Content::social(args.text).with_images(args.images);

    if dry_run {
        let platforms = preview_platforms(args.platforms, config);
        preview(&content, &platforms);
        return Ok(());
    }

    let formatter = publishers::formatter();
    let mut registry = publishers::build_registry(config, &formatter);

    let targets: Vec<String> = if args.platforms.is_empty() {
        registry.platforms().iter().map(|p| p.to_string()).collect()
    } else {
        args.platforms
    };

    if targets.is_empty() {
        tracing::warn!("No social platforms configured");
    }

    let mut tally = Tally::default();
    for platform in &targets {
        let Some(publisher) = registry.get_mut(platform) else {
            tracing::warn!(platform = %platform, "Platform not configured, skipping");
            println!("- {}: not configured", platform);
            tally.skipped += 1;
            continue;
        };

        match attempt(publisher, &content).await {
            Ok(result) => {
                tracing::info!(platform = %platform, url = %result.url, "Posted");
                println!("✓ {}: {}", platform, result.url);
                tally.posted += 1;
            }
            Err(e) => {
                tracing::error!(platform = %platform, error = %e, "Failed to post");
                println!("✗ {}: {}", platform, e);
                tally.failed += 1;
            }
        }
    }

    println!();
    println!(
        "Posted: {}, Failed: {}, Skipped: {}",
        tally.posted, tally.failed, tally.skipped
    );

    Ok(())
}

/// Requested platforms, else configured ones, else the built-in pair
fn preview_platforms(requested: Vec<String>, config: &AppConfig) -> Vec<String> {
    if !requested.is_empty() {
        return requested;
    }

    let configured = config.configured_platforms();
    let platforms = if configured.is_empty() {
        DEFAULT_PLATFORMS.to_vec()
    } else {
        configured
    };
    platforms.into_iter().map(String::from).collect()
}

fn preview(content: &Content, platforms: &[String]) {
    let formatter = publishers::formatter();

    println!("[dry-run] Nothing will be posted");
    for platform in platforms {
        let text = formatter.format_for_platform(content, platform);
        println!();
        println!("=== {} ({} chars) ===", platform, text.chars().count());
        println!("{}", text);
        for image in &content.image_paths {
            println!("[image] {}", image.display());
        }
    }
}
