//! Translation through a local CLI command (e.g. `claude -p`)

use async_trait::async_trait;
use indieshout_domain::{TranslateError, Translator};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

pub const DEFAULT_COMMAND: &str = "claude";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Nested sessions of the default command refuse to start while this is set
const NESTED_SESSION_ENV: &str = "CLAUDECODE";

/// Translator that shells out to a local command.
///
/// `{prompt}` in the arguments is replaced by the full prompt; without it
/// the prompt is written to stdin.
pub struct CommandTranslator {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandTranslator {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    async fn run_command(&self, prompt: &str) -> Result<String, TranslateError> {
        let (expanded_args, used_prompt_arg) = expand_args(&self.args, prompt);

        let mut command = Command::new(&self.command);
        command.args(&expanded_args);
        command.env_remove(NESTED_SESSION_ENV);
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);
        if used_prompt_arg {
            command.stdin(Stdio::null());
        } else {
            command.stdin(Stdio::piped());
        }

        let mut child = command.spawn().map_err(|e| {
            TranslateError::Command(format!("Failed to spawn {}: {}", self.command, e))
        })?;

        let mut stdin = child.stdin.take();
        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();

        // Feeding stdin and draining both pipes all run under the timeout
        let feed = async {
            if let Some(mut pipe) = stdin.take() {
                pipe.write_all(prompt.as_bytes()).await.map_err(|e| {
                    TranslateError::Command(format!("Failed to write to stdin: {}", e))
                })?;
            }
            Ok::<_, TranslateError>(())
        };
        let read_stdout = async {
            let mut out = Vec::new();
            if let Some(pipe) = stdout.as_mut() {
                pipe.read_to_end(&mut out).await?;
            }
            Ok::<_, std::io::Error>(out)
        };
        let read_stderr = async {
            let mut err = Vec::new();
            if let Some(pipe) = stderr.as_mut() {
                pipe.read_to_end(&mut err).await?;
            }
            Ok::<_, std::io::Error>(err)
        };
        let collect = async {
            let (fed, out, err) = tokio::join!(feed, read_stdout, read_stderr);
            let out = out.map_err(|e| TranslateError::Command(e.to_string()))?;
            let err = err.map_err(|e| TranslateError::Command(e.to_string()))?;
            let status = child
                .wait()
                .await
                .map_err(|e| TranslateError::Command(e.to_string()))?;
            // A child that exits without reading stdin reports its own failure
            if status.success() {
                fed?;
            }
            Ok::<_, TranslateError>((status, out, err))
        };

        let (status, stdout_bytes, stderr_bytes) =
            match tokio::time::timeout(self.timeout, collect).await {
                Ok(result) => result?,
                Err(_) => return Err(TranslateError::Timeout(self.timeout.as_secs())),
            };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(TranslateError::Command(format!(
                "{} exited with {}: {}",
                self.command,
                status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&stdout_bytes).trim().to_string();
        if stdout.is_empty() {
            return Err(TranslateError::EmptyOutput);
        }

        Ok(stdout)
    }
}

impl Default for CommandTranslator {
    fn default() -> Self {
        Self::new(
            DEFAULT_COMMAND,
            vec!["-p".to_string(), "{prompt}".to_string()],
            DEFAULT_TIMEOUT_SECS,
        )
    }
}

#[async_trait]
impl Translator for CommandTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        tracing::debug!(
            source = source_lang,
            target = target_lang,
            chars = text.chars().count(),
            "Translating"
        );

        let prompt = build_prompt(text, source_lang, target_lang);
        self.run_command(&prompt).await
    }
}

fn language_name(code: &str) -> &str {
    match code {
        "ko" => "Korean",
        "en" => "English",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        other => other,
    }
}

fn build_prompt(text: &str, source_lang: &str, target_lang: &str) -> String {
    format!(
        "Translate the following {} text to {}.\n\
         Keep all Markdown formatting, links and code blocks exactly as they are.\n\
         Return only the translated text with no explanations.\n\n{}",
        language_name(source_lang),
        language_name(target_lang),
        text
    )
}

fn expand_args(args: &[String], prompt: &str) -> (Vec<String>, bool) {
    let mut used_prompt_arg = false;
    let expanded = args
        .iter()
        .map(|arg| {
            if arg.contains("{prompt}") {
                used_prompt_arg = true;
                arg.replace("{prompt}", prompt)
            } else {
                arg.clone()
            }
        })
        .collect();

    (expanded, used_prompt_arg)
}
