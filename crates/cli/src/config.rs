//! Configuration loading and management
//!
//! Precedence, lowest first: config file, `INDIESHOUT__SECTION__KEY`
//! variables, then the fixed credential variables in [`ENV_OVERRIDES`].
//! A `.env` file in the working directory is loaded into the environment
//! before any of these are read.

use anyhow::{Context, Result};
use indieshout_adapters::x_api::X_API_BASE;
use indieshout_adapters::{storage::DEFAULT_REGION, threads::THREADS_API_BASE, translate};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use time::UtcOffset;
use time::macros::format_description;

/// Credential variables and the config keys they override
pub const ENV_OVERRIDES: [(&str, &str); 7] = [
    ("TWITTER_ACCESS_TOKEN", "twitter.access_token"),
    ("THREADS_ACCESS_TOKEN", "threads.access_token"),
    ("THREADS_USER_ID", "threads.user_id"),
    ("AWS_S3_BUCKET", "s3.bucket_name"),
    ("AWS_S3_REGION", "s3.region"),
    ("AWS_ACCESS_KEY_ID", "s3.access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "s3.secret_access_key"),
];

const DEFAULT_CONFIG_PATH: &str = "./config.toml";

/// Top-level configuration. Optional sections enable their platform.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub hugo: HugoConfig,

    #[serde(default)]
    pub twitter: Option<TwitterConfig>,

    #[serde(default)]
    pub threads: Option<ThreadsConfig>,

    #[serde(default)]
    pub s3: Option<S3Config>,

    #[serde(default)]
    pub translator: TranslatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Root of the content folders
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HugoConfig {
    #[serde(default = "default_blog_repo_path")]
    pub blog_repo_path: PathBuf,

    #[serde(default = "default_hugo_content_dir")]
    pub content_dir: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// `+HH:MM` offset post dates are stamped in
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
    /// OAuth 2.0 user-context token
    #[serde(default)]
    pub access_token: Option<SecretString>,

    #[serde(default = "default_x_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadsConfig {
    #[serde(default)]
    pub access_token: Option<SecretString>,

    #[serde(default)]
    pub user_id: String,

    #[serde(default = "default_threads_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    #[serde(default)]
    pub bucket_name: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub access_key_id: Option<SecretString>,

    #[serde(default)]
    pub secret_access_key: Option<SecretString>,

    #[serde(default)]
    pub public_base_url: Option<String>,

    /// S3-compatible endpoint (MinIO, R2)
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_translator_command")]
    pub command: String,

    /// `{prompt}` is replaced by the prompt; otherwise it goes to stdin
    #[serde(default = "default_translator_args")]
    pub args: Vec<String>,

    #[serde(default = "default_translator_timeout")]
    pub timeout_secs: u64,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("blog-content")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_blog_repo_path() -> PathBuf {
    PathBuf::from("./blog-site")
}

fn default_hugo_content_dir() -> String {
    "content/posts".to_string()
}

fn default_base_url() -> String {
    "https://example.com".to_string()
}

fn default_language() -> String {
    "ko".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["ko".to_string(), "en".to_string()]
}

fn default_utc_offset() -> String {
    "+09:00".to_string()
}

fn default_x_api_base() -> String {
    X_API_BASE.to_string()
}

fn default_threads_api_base() -> String {
    THREADS_API_BASE.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_true() -> bool {
    true
}

fn default_translator_command() -> String {
    translate::DEFAULT_COMMAND.to_string()
}

fn default_translator_args() -> Vec<String> {
    vec!["-p".to_string(), "{prompt}".to_string()]
}

fn default_translator_timeout() -> u64 {
    translate::DEFAULT_TIMEOUT_SECS
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Default for HugoConfig {
    fn default() -> Self {
        Self {
            blog_repo_path: default_blog_repo_path(),
            content_dir: default_hugo_content_dir(),
            base_url: default_base_url(),
            default_language: default_language(),
            languages: default_languages(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            command: default_translator_command(),
            args: default_translator_args(),
            timeout_secs: default_translator_timeout(),
        }
    }
}

impl HugoConfig {
    pub fn parsed_utc_offset(&self) -> Result<UtcOffset> {
        UtcOffset::parse(
            self.utc_offset.trim(),
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .with_context(|| format!("Invalid hugo.utc_offset: {}", self.utc_offset))
    }
}

impl AppConfig {
    /// Load configuration from file and the process environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to read .env file");
            }
        }

        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Load configuration, resolving the fixed credential variables with `env`
    pub fn load_with_env<F>(config_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder();

        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("INDIESHOUT")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in ENV_OVERRIDES {
            let value = env(var).filter(|v| !v.is_empty());
            builder = builder
                .set_override_option(key, value)
                .with_context(|| format!("Failed to apply {}", var))?;
        }

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Names of the social platforms with a config section
    pub fn configured_platforms(&self) -> Vec<&'static str> {
        let mut platforms = Vec::new();
        if self.twitter.is_some() {
            platforms.push("x");
        }
        if self.threads.is_some() {
            platforms.push("threads");
        }
        platforms
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# indieshout configuration
#
# Credentials may also come from the environment (or a .env file):
#   TWITTER_ACCESS_TOKEN, THREADS_ACCESS_TOKEN, THREADS_USER_ID,
#   AWS_S3_BUCKET, AWS_S3_REGION, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY
# Any key can be overridden as INDIESHOUT__SECTION__KEY.

[general]
content_dir = "blog-content"
log_level = "info"

[hugo]
blog_repo_path = "./blog-site"
content_dir = "content/posts"
base_url = "https://example.com"
default_language = "ko"
languages = ["ko", "en"]
utc_offset = "+09:00"

# Remove a platform section to disable that platform.
[twitter]
# access_token = "..."  # OAuth 2.0 user-context token
api_base = "https://api.twitter.com"

[threads]
# access_token = "..."
# user_id = "..."
api_base = "https://graph.threads.net/v1.0"

# Uncomment to rehost images on S3.
# [s3]
# bucket_name = "my-blog-images"
# region = "ap-northeast-2"
# public_base_url = "https://cdn.example.com"
# endpoint_url = "http://localhost:9000"  # S3-compatible storage

[translator]
enabled = true
command = "claude"
args = ["-p", "{prompt}"]
timeout_secs = 180
"#
        .to_string()
    }
}
