//! Builds the adapters a command needs from configuration

use anyhow::Result;
use indieshout_adapters::{
    blog::{HugoPublisher, HugoSettings},
    content::FsContentRepo,
    git::GitCli,
    storage::{S3Settings, S3Storage},
    threads::ThreadsPublisher,
    translate::CommandTranslator,
    x_api::XPublisher,
};
use indieshout_domain::PublisherRegistry;
use indieshout_domain::formatter::PlatformFormatter;
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared formatter for every social publisher and preview
pub fn formatter() -> Arc<PlatformFormatter> {
    Arc::new(PlatformFormatter::with_builtin_rules())
}

/// Publishers for every social platform with a config section
pub fn build_registry(config: &AppConfig, formatter: &Arc<PlatformFormatter>) -> PublisherRegistry {
    let mut registry = PublisherRegistry::new();

    if let Some(twitter) = &config.twitter {
        let publisher = XPublisher::with_base_url(
            token_or_empty(&twitter.access_token),
            twitter.api_base.clone(),
        )
        .with_formatter(formatter.clone());
        registry.register(Box::new(publisher));
    }

    if let Some(threads) = &config.threads {
        let publisher = ThreadsPublisher::with_base_url(
            token_or_empty(&threads.access_token),
            threads.user_id.clone(),
            threads.api_base.clone(),
        )
        .with_formatter(formatter.clone());
        registry.register(Box::new(publisher));
    }

    tracing::debug!(platforms = ?registry.platforms(), "Configured social publishers");
    registry
}

/// Missing tokens surface as an authentication failure on first use
fn token_or_empty(token: &Option<SecretString>) -> SecretString {
    token.clone().unwrap_or_else(|| SecretString::new("".into()))
}

pub fn hugo_settings(config: &AppConfig) -> Result<HugoSettings> {
    Ok(HugoSettings {
        repo_path: config.hugo.blog_repo_path.clone(),
        content_dir: config.hugo.content_dir.clone(),
        base_url: config.hugo.base_url.clone(),
        default_language: config.hugo.default_language.clone(),
        languages: config.hugo.languages.clone(),
        utc_offset: config.hugo.parsed_utc_offset()?,
    })
}

/// Hugo publisher; S3 and the translator are attached only when configured
pub async fn build_blog(config: &AppConfig) -> Result<HugoPublisher> {
    let settings = hugo_settings(config)?;
    let vcs = Arc::new(GitCli::new(&settings.repo_path));
    let mut blog = HugoPublisher::new(settings, vcs);

    match &config.s3 {
        Some(s3) if !s3.bucket_name.trim().is_empty() => {
            let storage = S3Storage::connect(S3Settings {
                bucket_name: s3.bucket_name.clone(),
                region: s3.region.clone(),
                access_key_id: s3.access_key_id.clone(),
                secret_access_key: s3.secret_access_key.clone(),
                public_base_url: s3.public_base_url.clone(),
                endpoint_url: s3.endpoint_url.clone(),
            })
            .await;
            blog = blog.with_storage(Arc::new(storage));
        }
        Some(_) => tracing::warn!("s3 section has no bucket_name, images stay local"),
        None => tracing::debug!("S3 not configured, images stay local"),
    }

    if config.translator.enabled {
        let translator = CommandTranslator::new(
            config.translator.command.clone(),
            config.translator.args.clone(),
            config.translator.timeout_secs,
        );
        blog = blog.with_translator(Arc::new(translator));
    }

    Ok(blog)
}

pub fn content_root(config: &AppConfig, override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(|| config.general.content_dir.clone())
}

pub fn build_content_repo(config: &AppConfig, override_dir: Option<PathBuf>) -> FsContentRepo {
    FsContentRepo::new(content_root(config, override_dir))
}
