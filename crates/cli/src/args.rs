//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// indieshout: publish one piece of writing to your blog, X and Threads
#[derive(Parser, Debug)]
#[command(name = "indieshout")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Blog publishing
    Blog(BlogArgs),

    /// Social platform posting
    Sns(SnsArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct BlogArgs {
    #[command(subcommand)]
    pub command: BlogCommands,
}

#[derive(Subcommand, Debug)]
pub enum BlogCommands {
    /// Preview a markdown file as a blog post and social posts (dry run)
    Publish {
        /// Markdown file to publish
        file: PathBuf,

        /// Comma-separated social platforms to preview (e.g. x,threads)
        #[arg(long, value_delimiter = ',')]
        platforms: Vec<String>,
    },

    /// Publish a content folder to the blog, then to social platforms
    PublishFolder(PublishFolderArgs),

    /// List content folders
    List {
        /// Override the content root directory
        #[arg(long)]
        content_dir: Option<PathBuf>,
    },

    /// Push committed posts to the blog remote
    Deploy,
}

#[derive(Args, Debug)]
pub struct PublishFolderArgs {
    /// Folder name under the content root
    pub name: String,

    /// Format and validate only, publish nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the blog and post the social text without a link
    #[arg(long)]
    pub skip_blog: bool,

    /// Publish the blog post only
    #[arg(long)]
    pub skip_sns: bool,

    /// Override the content root directory
    #[arg(long)]
    pub content_dir: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SnsArgs {
    #[command(subcommand)]
    pub command: SnsCommands,
}

#[derive(Subcommand, Debug)]
pub enum SnsCommands {
    /// Post text to social platforms
    Post(SnsPostArgs),
}

#[derive(Args, Debug)]
pub struct SnsPostArgs {
    /// Text to post
    pub text: String,

    /// Image to attach (repeatable)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// Comma-separated platforms; defaults to every configured platform
    #[arg(long, value_delimiter = ',')]
    pub platforms: Vec<String>,

    /// Preview only (default)
    #[arg(long, overrides_with = "no_dry_run")]
    pub dry_run: bool,

    /// Actually post
    #[arg(long, overrides_with = "dry_run")]
    pub no_dry_run: bool,
}

impl SnsPostArgs {
    /// Dry run unless `--no-dry-run` was the last of the pair
    pub fn is_dry_run(&self) -> bool {
        !self.no_dry_run
    }
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
