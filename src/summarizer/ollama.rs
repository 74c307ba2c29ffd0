use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::app::{PaperfeedError, Result};
use crate::summarizer::{build_prompt, Pass, Summarizer};

pub const DEFAULT_MODEL: &str = "deepseek-r1:70b";

/// Runs prompts through a local `ollama run <model>` process, with the
/// prompt on stdin and the answer on stdout.
#[derive(Debug, Clone)]
pub struct OllamaSummarizer {
    pub command: String,
    pub model: String,
    pub merge_model: String,
}

impl Default for OllamaSummarizer {
    fn default() -> Self {
        Self {
            command: "ollama".to_string(),
            model: DEFAULT_MODEL.to_string(),
            merge_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl OllamaSummarizer {
    pub fn new(command: impl Into<String>, model: impl Into<String>, merge_model: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            model: model.into(),
            merge_model: merge_model.into(),
        }
    }

    pub fn model_for(&self, pass: Pass) -> &str {
        match pass {
            Pass::Draft => &self.model,
            Pass::Merge => &self.merge_model,
        }
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn complete(&self, pass: Pass, prompt: &str, content: &str) -> Result<String> {
        let model = self.model_for(pass);
        let input = build_prompt(prompt, content);
        tracing::debug!(
            "Querying {} {}: prompt {} chars, content {} chars",
            self.command,
            model,
            prompt.len(),
            content.len()
        );

        let mut child = Command::new(&self.command)
            .args(["run", model])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PaperfeedError::Summarizer(format!("Failed to start {}: {}", self.command, e)))?;

        // Feed stdin while collecting output; stdin is closed once written.
        let stdin = child.stdin.take();
        let send = async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(input.as_bytes()).await,
                None => Ok(()),
            }
        };
        let (sent, output) = tokio::join!(send, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("{} run {} failed: {}", self.command, model, stderr.trim());
            return Err(PaperfeedError::Summarizer(format!(
                "{} run {} exited with {}: {}",
                self.command,
                model,
                output.status,
                stderr.trim()
            )));
        }

        if let Err(e) = sent {
            return Err(PaperfeedError::Summarizer(format!(
                "{} run {} stopped reading the prompt: {}",
                self.command, model, e
            )));
        }

        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!("{} returned {} chars", model, answer.len());
        Ok(answer)
    }
}
