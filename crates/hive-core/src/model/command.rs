//! Subprocess-backed model.
//!
//! Runs a configured CLI once per generation, writes the prompt to its
//! stdin and returns whatever it prints on stdout. The default command is
//! `claude -p --model {model}`; any argument containing `{model}` has it
//! replaced with the requested model identifier.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::debug;

use super::trait_def::Model;

/// Placeholder substituted with the model identifier in arguments.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Maximum number of stderr bytes quoted in an error message.
const STDERR_SNIPPET_BYTES: usize = 1024;

/// A [`Model`] that shells out to an inference CLI.
#[derive(Debug, Clone)]
pub struct CommandModel {
    program: String,
    args: Vec<String>,
}

impl CommandModel {
    /// Binary used by [`CommandModel::default`].
    pub const DEFAULT_PROGRAM: &str = "claude";

    /// Create a model that runs `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Arguments used by [`CommandModel::default`].
    pub fn default_args() -> Vec<String> {
        vec![
            "-p".to_string(),
            "--model".to_string(),
            MODEL_PLACEHOLDER.to_string(),
        ]
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with the model placeholder resolved.
    pub fn resolved_args(&self, model_id: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace(MODEL_PLACEHOLDER, model_id))
            .collect()
    }
}

impl Default for CommandModel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM, Self::default_args())
    }
}

#[async_trait]
impl Model for CommandModel {
    fn name(&self) -> &str {
        "command"
    }

    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String> {
        let args = self.resolved_args(model_id);
        debug!(program = %self.program, ?args, "spawning model command");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "failed to execute model command: {} {}",
                    self.program,
                    args.join(" ")
                )
            })?;

        let mut stdin_pipe = child.stdin.take();
        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        // Feed stdin while draining stdout/stderr so a large prompt or
        // reply cannot fill a pipe buffer and stall both sides.
        let write_stdin = async {
            if let Some(mut pipe) = stdin_pipe.take() {
                match pipe.write_all(prompt.as_bytes()).await {
                    Ok(()) => pipe.shutdown().await,
                    // The command may exit without reading its input.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                    Err(e) => Err(e),
                }
            } else {
                Ok(())
            }
        };

        let read_stdout = async {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stdout_pipe {
                pipe.read_to_end(&mut buf).await.ok();
            }
            String::from_utf8_lossy(&buf).into_owned()
        };

        let read_stderr = async {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stderr_pipe {
                pipe.read_to_end(&mut buf).await.ok();
            }
            String::from_utf8_lossy(&buf).into_owned()
        };

        let (write_result, stdout, stderr) = tokio::join!(write_stdin, read_stdout, read_stderr);
        let status = child
            .wait()
            .await
            .with_context(|| format!("failed to wait on model command {}", self.program))?;
        match write_result {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Err(e) => {
                return Err(e).context("failed to write prompt to model command stdin");
            }
        }

        if !status.success() {
            bail!(
                "model command {} exited with {}: {}",
                self.program,
                status
                    .code()
                    .map_or_else(|| "a signal".to_string(), |c| format!("code {c}")),
                snippet(&stderr, STDERR_SNIPPET_BYTES),
            );
        }

        if stdout.trim().is_empty() {
            bail!("model command {} produced no output", self.program);
        }

        Ok(stdout)
    }
}

/// Truncate `text` to at most `max` bytes on a char boundary.
fn snippet(text: &str, max: usize) -> &str {
    let text = text.trim();
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_targets_claude() {
        let model = CommandModel::default();
        assert_eq!(model.program(), "claude");
        assert_eq!(
            model.resolved_args("sonnet"),
            vec!["-p", "--model", "sonnet"]
        );
    }

    #[test]
    fn placeholder_is_replaced_inside_arguments() {
        let model = CommandModel::new("llm", vec!["--model={model}".to_string(), "-q".to_string()]);
        assert_eq!(model.resolved_args("granite"), vec!["--model=granite", "-q"]);
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let text = "ééé";
        assert_eq!(snippet(text, 3), "é");
        assert_eq!(snippet("short", 100), "short");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn prompt_is_piped_through_stdin() {
        let model = CommandModel::new("cat", vec![]);
        let reply = model.generate("#Task1: hello", "any").await.unwrap();
        assert_eq!(reply, "#Task1: hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn model_id_reaches_the_command() {
        let model = CommandModel::new("echo", vec![MODEL_PLACEHOLDER.to_string()]);
        let reply = model.generate("ignored", "granite-3").await.unwrap();
        assert_eq!(reply.trim_end(), "granite-3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_an_error() {
        let model = CommandModel::new(
            "sh",
            vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
        );
        let err = model.generate("p", "m").await.unwrap_err().to_string();
        assert!(err.contains("code 3"), "unexpected error: {err}");
        assert!(err.contains("boom"), "unexpected error: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn empty_output_is_an_error() {
        let model = CommandModel::new("true", vec![]);
        let err = model.generate("p", "m").await.unwrap_err().to_string();
        assert!(err.contains("no output"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let model = CommandModel::new("/nonexistent/hive-model-binary", vec![]);
        let err = model.generate("p", "m").await.unwrap_err().to_string();
        assert!(err.contains("failed to execute model command"), "unexpected error: {err}");
    }
}
