//! Git CLI adapter for the blog repository

use async_trait::async_trait;
use indieshout_domain::{CommitOutcome, VcsError, VersionControl};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;

/// Runs `git` with the blog repository as working directory
pub struct GitCli {
    repo: PathBuf,
    program: String,
    leading_args: Vec<String>,
}

impl GitCli {
    pub fn new(repo: impl AsRef<Path>) -> Self {
        Self::with_command(repo, "git", Vec::new())
    }

    /// Run `program leading_args... <git args>` instead of `git`
    pub fn with_command(
        repo: impl AsRef<Path>,
        program: impl Into<String>,
        leading_args: Vec<String>,
    ) -> Self {
        Self {
            repo: repo.as_ref().to_path_buf(),
            program: program.into(),
            leading_args,
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    async fn run(&self, args: &[&str]) -> Result<Output, VcsError> {
        tracing::debug!(repo = %self.repo.display(), args = ?args, "Running git");

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .current_dir(&self.repo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(output)
    }

    async fn run_checked(&self, args: &[&str]) -> Result<Output, VcsError> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(command_error(args, &output));
        }
        Ok(output)
    }
}

fn command_error(args: &[&str], output: &Output) -> VcsError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stderr = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };

    VcsError::Command {
        command: format!("git {}", args.join(" ")),
        stderr,
    }
}

fn is_nothing_to_commit(output: &Output) -> bool {
    // git prints this on stdout, some versions on stderr
    [&output.stdout, &output.stderr]
        .iter()
        .any(|stream| String::from_utf8_lossy(stream).contains("nothing to commit"))
}

#[async_trait]
impl VersionControl for GitCli {
    async fn ensure_identity(&self) -> Result<(), VcsError> {
        let output = self.run_checked(&["config", "user.name"]).await?;
        if String::from_utf8_lossy(&output.stdout).trim().is_empty() {
            return Err(VcsError::Command {
                command: "git config user.name".to_string(),
                stderr: "user.name is empty".to_string(),
            });
        }
        Ok(())
    }

    async fn add(&self, paths: &[PathBuf]) -> Result<(), VcsError> {
        let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let mut args = vec!["add"];
        args.extend(paths.iter().map(String::as_str));

        self.run_checked(&args).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<CommitOutcome, VcsError> {
        let args = ["commit", "-m", message];
        let output = self.run(&args).await?;

        if output.status.success() {
            return Ok(CommitOutcome::Committed);
        }
        if is_nothing_to_commit(&output) {
            return Ok(CommitOutcome::NothingToCommit);
        }
        Err(command_error(&args, &output))
    }

    async fn push(&self) -> Result<(), VcsError> {
        self.run_checked(&["push"]).await?;
        Ok(())
    }
}
