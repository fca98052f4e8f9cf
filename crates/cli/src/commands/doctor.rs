//! Doctor command - validate configuration and show status

use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    content: CheckResult,
    blog_repo: CheckResult,
    twitter: CheckResult,
    threads: CheckResult,
    s3: CheckResult,
    translator: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        content: CheckResult::error("Not checked"),
        blog_repo: CheckResult::error("Not checked"),
        twitter: CheckResult::error("Not checked"),
        threads: CheckResult::error("Not checked"),
        s3: CheckResult::error("Not checked"),
        translator: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.content = check_content_dir(&config.general.content_dir);
        report.blog_repo = check_blog_repo(config);
        report.twitter = check_twitter(config);
        report.threads = check_threads(config);
        report.s3 = check_s3(config);
        report.translator = check_translator(config);
    }

    let checks = [
        &report.config,
        &report.content,
        &report.blog_repo,
        &report.twitter,
        &report.threads,
        &report.s3,
        &report.translator,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_content_dir(dir: &Path) -> CheckResult {
    if !dir.is_dir() {
        return CheckResult::warn(format!(
            "Content directory does not exist: {}",
            dir.display()
        ));
    }

    let folders: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .filter_map(|e| e.file_name().to_str().map(String::from))
                .filter(|name| !name.starts_with('.'))
                .collect()
        })
        .unwrap_or_default();

    CheckResult::ok(format!(
        "{}: {} content folder(s)",
        dir.display(),
        folders.len()
    ))
    .with_details(serde_json::json!({ "count": folders.len() }))
}

fn check_blog_repo(config: &AppConfig) -> CheckResult {
    let repo = &config.hugo.blog_repo_path;

    if let Err(e) = config.hugo.parsed_utc_offset() {
        return CheckResult::error(format!("{:#}", e));
    }

    if !repo.is_dir() {
        return CheckResult::error(format!(
            "Blog repository does not exist: {}",
            repo.display()
        ));
    }

    if !repo.join(".git").exists() {
        return CheckResult::warn(format!("{} is not a git repository", repo.display()));
    }

    if !command_exists("git") {
        return CheckResult::warn("git not found on PATH");
    }

    CheckResult::ok(format!(
        "{} (languages: {})",
        repo.display(),
        config.hugo.languages.join(", ")
    ))
    .with_details(serde_json::json!({
        "base_url": config.hugo.base_url,
        "default_language": config.hugo.default_language,
        "utc_offset": config.hugo.utc_offset,
    }))
}

fn is_set(secret: &Option<SecretString>) -> bool {
    secret
        .as_ref()
        .is_some_and(|s| !s.expose_secret().trim().is_empty())
}

fn check_twitter(config: &AppConfig) -> CheckResult {
    let Some(twitter) = &config.twitter else {
        return CheckResult::ok("Not configured");
    };

    if is_set(&twitter.access_token) {
        CheckResult::ok(format!("Access token: set, API: {}", twitter.api_base))
    } else {
        CheckResult::warn("Access token not set (TWITTER_ACCESS_TOKEN)")
    }
}

fn check_threads(config: &AppConfig) -> CheckResult {
    let Some(threads) = &config.threads else {
        return CheckResult::ok("Not configured");
    };

    match (is_set(&threads.access_token), threads.user_id.trim().is_empty()) {
        (true, false) => CheckResult::ok(format!("User: {}, Access token: set", threads.user_id)),
        (false, _) => CheckResult::warn("Access token not set (THREADS_ACCESS_TOKEN)"),
        (true, true) => CheckResult::warn("User id not set (THREADS_USER_ID)"),
    }
}

fn check_s3(config: &AppConfig) -> CheckResult {
    let Some(s3) = &config.s3 else {
        return CheckResult::ok("Not configured, images stay local");
    };

    if s3.bucket_name.trim().is_empty() {
        return CheckResult::warn("Bucket name not set (AWS_S3_BUCKET)");
    }

    let credentials = if is_set(&s3.access_key_id) && is_set(&s3.secret_access_key) {
        "explicit keys"
    } else {
        "default AWS chain"
    };

    CheckResult::ok(format!(
        "Bucket: {}, Region: {}, Credentials: {}",
        s3.bucket_name, s3.region, credentials
    ))
}

fn check_translator(config: &AppConfig) -> CheckResult {
    let translator = &config.translator;

    if !translator.enabled {
        return CheckResult::ok("Translation disabled");
    }

    if translator.command.trim().is_empty() {
        return CheckResult::error("Translator command is empty");
    }

    if command_exists(&translator.command) {
        CheckResult::ok(format!(
            "Command: {}, Timeout: {}s",
            translator.command, translator.timeout_secs
        ))
    } else {
        CheckResult::warn(format!(
            "Command not found on PATH: {} (posts publish untranslated)",
            translator.command
        ))
    }
}

fn command_exists(command: &str) -> bool {
    let path = Path::new(command);
    if path.components().count() > 1 {
        return path.is_file();
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths).any(|dir| dir.join(command).is_file())
}

fn print_report(report: &DoctorReport) {
    println!("indieshout Doctor Report");
    println!("========================");
    println!();

    print_check("Config", &report.config);
    print_check("Content", &report.content);
    print_check("Blog Repository", &report.blog_repo);
    print_check("X", &report.twitter);
    print_check("Threads", &report.threads);
    print_check("S3", &report.s3);
    print_check("Translator", &report.translator);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready! Try: indieshout blog publish-folder <name> --dry-run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
