//! Text-completion service used to answer and summarize.
//!
//! The pipeline only sees the [`TextCompletionService`] trait, so the model
//! can live in a local subprocess, behind HTTP, or in-process.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::{RagError, Result};

/// A black-box text completion: one prompt in, one string out.
#[async_trait]
pub trait TextCompletionService: Send + Sync {
    /// Complete `prompt`.
    ///
    /// Failures are reported as [`RagError::Generation`].
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short name used in logs and error messages.
    fn name(&self) -> &str;
}

/// Runs a local program per request, writing the prompt to its stdin.
///
/// Standard output, trimmed, is the completion. A non-zero exit status is a
/// [`RagError::Generation`] carrying the program's stderr. There is no
/// timeout and no retry.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{SubprocessCompletion, TextCompletionService};
///
/// let llm = SubprocessCompletion::ollama("gemma3:1b");
/// let answer = llm.generate("Why is the sky blue?").await?;
/// ```
#[derive(Debug, Clone)]
pub struct SubprocessCompletion {
    name: String,
    program: String,
    args: Vec<String>,
}

impl SubprocessCompletion {
    /// Default model for [`ollama`](Self::ollama).
    pub const DEFAULT_OLLAMA_MODEL: &'static str = "gemma3:1b";

    /// Run `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args: Vec::new(),
        }
    }

    /// Append an argument to the command line.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Override the name reported in logs and errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// `ollama run <model>`.
    pub fn ollama(model: impl Into<String>) -> Self {
        Self::new("ollama")
            .arg("run")
            .arg(model)
            .with_name("ollama")
    }

    fn failure(&self, message: String) -> RagError {
        error!(backend = %self.name, error = %message, "generation failed");
        RagError::Generation {
            backend: self.name.clone(),
            message,
        }
    }
}

#[async_trait]
impl TextCompletionService for SubprocessCompletion {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(backend = %self.name, prompt_len = prompt.len(), "spawning completion process");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.failure(format!("failed to start '{}': {e}", self.program)))?;

        // Written from a separate task so a program that echoes while reading
        // cannot fill its stdout pipe and stall. Dropping stdin closes it.
        let writer = child.stdin.take().map(|mut stdin| {
            let bytes = prompt.as_bytes().to_vec();
            tokio::spawn(async move { stdin.write_all(&bytes).await })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.failure(format!("failed to read output: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(format!("{}: {}", output.status, stderr.trim())));
        }

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The program exited successfully without reading all of its input.
                Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!(backend = %self.name, "completion process closed stdin early");
                }
                Ok(Err(e)) => return Err(self.failure(format!("failed to write prompt: {e}"))),
                Err(e) => return Err(self.failure(format!("prompt writer task failed: {e}"))),
            }
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stdout_of_the_program_is_the_completion() {
        let llm = SubprocessCompletion::new("cat");
        let out = llm.generate("  echoed prompt\n").await.unwrap();
        assert_eq!(out, "echoed prompt");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_generation_error() {
        let llm = SubprocessCompletion::new("sh")
            .arg("-c")
            .arg("echo boom >&2; exit 3");
        let err = llm.generate("prompt").await.unwrap_err();
        match err {
            RagError::Generation { backend, message } => {
                assert_eq!(backend, "sh");
                assert!(message.contains("boom"), "message was {message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_generation_error() {
        let llm = SubprocessCompletion::new("docqa-definitely-not-installed");
        assert!(matches!(
            llm.generate("x").await,
            Err(RagError::Generation { .. })
        ));
    }

    #[test]
    fn ollama_command_line() {
        let llm = SubprocessCompletion::ollama("llama3");
        assert_eq!(llm.name(), "ollama");
        assert_eq!(llm.args, ["run", "llama3"]);
    }
}
