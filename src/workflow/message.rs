//! Commit message drafting and AI review.
//!
//! Both operations are best-effort: the analyzer result is used when it
//! parses, and a deterministic template message stands in when it does not.
//! Neither ever aborts the workflow.

use serde::Deserialize;
use tracing::debug;

use crate::ollama::Analyzer;
use crate::ollama::json::extract_object;
use crate::ollama::retry::RetryPolicy;

#[derive(Debug, Deserialize)]
struct RawMessage {
    commit_message: String,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(default)]
    review_comments: Vec<String>,
}

fn build_message_prompt(files: &[String], diff: &str) -> String {
    let file_list =
        files.iter().map(|f| format!("- {f}")).collect::<Vec<_>>().join("\n");

    format!(
        r#"You are an expert developer writing a commit message for the staged changes below.

Files in this commit:
{file_list}

Staged diff:
```diff
{diff}
```

Write ONE conventional commit message (type(scope): description, imperative mood, under 72 characters for the first line). Respond with ONLY a JSON object:
{{"commit_message": "..."}}"#
    )
}

fn build_review_prompt(message: &str, diff: &str) -> String {
    format!(
        r#"You are a thorough code reviewer. Review the staged changes below, which are about to be committed with the message: "{message}"

Staged diff:
```diff
{diff}
```

List concrete observations: possible bugs, missing pieces, or mismatches between the message and the change. Respond with ONLY a JSON object:
{{"review_comments": ["...", "..."]}}"#
    )
}

/// Parse a drafted message out of an analyzer response.
fn parse_message(response: &str) -> Option<String> {
    let json = extract_object(response)?;
    let raw: RawMessage = serde_json::from_str(&json).ok()?;
    let trimmed = raw.commit_message.trim();
    (!trimmed.is_empty()).then(|| trimmed.lines().collect::<Vec<_>>().join("\n"))
}

fn parse_review(response: &str) -> Option<Vec<String>> {
    let json = extract_object(response)?;
    let raw: RawReview = serde_json::from_str(&json).ok()?;
    (!raw.review_comments.is_empty()).then_some(raw.review_comments)
}

/// Scope for the template message: the group label when it reads like a
/// scope token, else the dominant file extension, else `batch`.
fn fallback_scope(label: &str, files: &[String]) -> String {
    let candidate = label.trim().to_ascii_lowercase();
    if !candidate.is_empty()
        && candidate.len() <= 20
        && candidate.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return candidate;
    }

    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for file in files {
        if let Some((_, ext)) = file.rsplit_once('.')
            && !ext.is_empty()
            && !ext.contains('/')
        {
            *counts.entry(ext).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, n)| *n)
        .map(|(ext, _)| ext.to_string())
        .unwrap_or_else(|| "batch".to_string())
}

/// Deterministic template message used when drafting fails.
pub fn fallback_message(label: &str, files: &[String]) -> String {
    format!("chore({}): update {} file(s)", fallback_scope(label, files), files.len())
}

/// Draft a commit message for a staged selection. Never fails: analyzer or
/// parse failures yield the template message.
pub async fn draft_message(
    analyzer: &dyn Analyzer,
    retry: &RetryPolicy,
    label: &str,
    files: &[String],
    diff: Option<&str>,
) -> String {
    let Some(diff) = diff else {
        return fallback_message(label, files);
    };

    let prompt = build_message_prompt(files, diff);
    match retry.run(|| analyzer.complete(&prompt)).await {
        Ok(response) => parse_message(&response).unwrap_or_else(|| {
            debug!("Unusable message response, using template");
            fallback_message(label, files)
        }),
        Err(e) => {
            debug!("Analyzer unavailable for message drafting: {e}");
            fallback_message(label, files)
        }
    }
}

/// Ask the analyzer to review a staged selection. `None` when the analyzer
/// is unavailable or the response does not parse.
pub async fn review_selection(
    analyzer: &dyn Analyzer,
    retry: &RetryPolicy,
    message: &str,
    diff: &str,
) -> Option<Vec<String>> {
    let prompt = build_review_prompt(message, diff);
    match retry.run(|| analyzer.complete(&prompt)).await {
        Ok(response) => parse_review(&response),
        Err(e) => {
            debug!("Analyzer unavailable for review: {e}");
            None
        }
    }
}
