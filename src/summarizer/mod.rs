//! LLM summarization of formatted feed text.
//!
//! A [`Summarizer`] answers one prompt over one block of content.
//! [`summarize`] asks the same question several times and has the model
//! merge the answers, which smooths out single-run misses.

pub mod ollama;

pub use ollama::OllamaSummarizer;

use async_trait::async_trait;

use crate::app::Result;

/// Prompt for the merge pass.
pub const MERGE_PROMPT: &str = "Merge all result to one!";

/// Default per-article prompt.
pub const DEFAULT_PROMPT: &str = "For each article, keep the full title, write a 1-2 sentence summary \
focusing on objective, method, and key findings, and clearly indicate whether the study appears \
to be high-impact based on novelty or significance.";

/// Which model a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Draft,
    Merge,
}

#[async_trait]
pub trait Summarizer {
    async fn complete(&self, pass: Pass, prompt: &str, content: &str) -> Result<String>;
}

/// Full prompt sent to the model for one request.
pub fn build_prompt(prompt: &str, content: &str) -> String {
    format!("{}\n\nHere is the content:\n{}", prompt, content)
}

/// Drop any reasoning preamble: keep only what follows the first
/// `</think>` tag, or the whole answer when there is none.
pub fn strip_reasoning(answer: &str) -> &str {
    match answer.split("</think>").nth(1) {
        Some(rest) => rest.trim(),
        None => answer,
    }
}

/// Run `iterations` draft passes, then merge the drafts into one answer.
pub async fn summarize<S>(summarizer: &S, prompt: &str, content: &str, iterations: usize) -> Result<String>
where
    S: Summarizer + ?Sized,
{
    let mut drafts = String::new();

    for i in 0..iterations {
        tracing::debug!("Summary draft {} of {}", i + 1, iterations);
        let answer = summarizer.complete(Pass::Draft, prompt, content).await?;
        drafts.push_str(&format!("results {}:{}", i, strip_reasoning(&answer)));
    }

    let merged = summarizer.complete(Pass::Merge, MERGE_PROMPT, &drafts).await?;
    Ok(strip_reasoning(&merged).to_string())
}
