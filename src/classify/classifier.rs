//! Per-file classification.
//!
//! Every file gets a deterministic fallback classification from the rule
//! table first; the analyzer is then asked for a richer one. If the
//! analyzer is unavailable, times out, or returns something unusable, the
//! fallback stands. Classification never blocks the workflow and never
//! leaves a file unclassified.

use serde::Deserialize;
use tracing::debug;

use crate::classify::rules::match_rule;
use crate::git::Vcs;
use crate::ollama::Analyzer;
use crate::ollama::json::extract_object;
use crate::ollama::retry::RetryPolicy;
use crate::scan::{ChangeKind, ChangeRecord};

/// Maximum characters of file content or diff sent to the analyzer.
pub(crate) const MAX_PAYLOAD_CHARS: usize = 24_000;

/// Rough blast radius of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    #[default]
    Medium,
    High,
}

/// Semantic tags attached to one changed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub path: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub feature_area: String,
    pub dependency_tags: Vec<String>,
    pub impact_level: ImpactLevel,
}

/// Analyzer response shape; `summary`, `keywords` and `feature_area` are
/// required, the rest default.
#[derive(Debug, Deserialize)]
struct RawClassification {
    summary: String,
    keywords: Vec<String>,
    feature_area: String,
    #[serde(default)]
    dependency_tags: Vec<String>,
    #[serde(default)]
    impact_level: ImpactLevel,
}

/// Deterministic classification from the rule table.
///
/// A pure function of `(path, kind)`: identical inputs always yield
/// identical output.
pub fn fallback_classification(path: &str, kind: ChangeKind) -> Classification {
    let rule = match_rule(path);
    let verb = match kind {
        ChangeKind::Added => "Add",
        ChangeKind::Modified => "Update",
    };
    let dependency_tags = if rule.feature_area == "dependencies" {
        rule.tags.iter().map(|t| t.to_string()).collect()
    } else {
        Vec::new()
    };

    Classification {
        path: path.to_string(),
        summary: format!("{verb} {path}"),
        keywords: rule.tags.iter().map(|t| t.to_string()).collect(),
        feature_area: rule.feature_area.to_string(),
        dependency_tags,
        impact_level: match kind {
            ChangeKind::Added => ImpactLevel::Medium,
            ChangeKind::Modified => ImpactLevel::Low,
        },
    }
}

/// Build the classification task prompt around a capped payload.
fn build_classification_prompt(path: &str, kind: ChangeKind, payload: &str) -> String {
    let (intro, section) = match kind {
        ChangeKind::Added => (
            format!(
                "The following is a new file named `{path}`. Analyze its content to understand its purpose."
            ),
            format!("File content:\n```\n{payload}\n```"),
        ),
        ChangeKind::Modified => (
            format!("Analyze the following git diff for the file `{path}`."),
            format!("Git diff:\n```diff\n{payload}\n```"),
        ),
    };

    format!(
        r#"You are an expert developer. {intro}

{section}

Respond with ONLY a JSON object (no markdown, no explanation) with these keys:
- "summary": one short sentence describing the file's purpose or its changes
- "keywords": array of 1-3 lowercase keywords categorizing the change
- "feature_area": one lowercase word naming the feature this file belongs to (e.g. "auth", "ui", "api")
- "dependency_tags": array of external packages or modules this change touches (may be empty)
- "impact_level": "low", "medium", or "high"

Example:
{{"summary": "Adds a loading spinner for data fetching.", "keywords": ["ui", "loading"], "feature_area": "ui", "dependency_tags": [], "impact_level": "low"}}"#
    )
}

/// Truncate a payload on a char boundary.
pub(crate) fn cap_payload(mut payload: String) -> String {
    if payload.len() > MAX_PAYLOAD_CHARS {
        let mut idx = MAX_PAYLOAD_CHARS;
        while !payload.is_char_boundary(idx) {
            idx -= 1;
        }
        payload.truncate(idx);
    }
    payload
}

/// Parse an analyzer response into a classification, or `None` when the
/// response is missing, unfenceable, or lacks a required field.
fn parse_classification(path: &str, response: &str) -> Option<Classification> {
    let json = extract_object(response)?;
    let raw: RawClassification = serde_json::from_str(&json).ok()?;

    if raw.summary.trim().is_empty() || raw.feature_area.trim().is_empty() || raw.keywords.is_empty()
    {
        return None;
    }

    Some(Classification {
        path: path.to_string(),
        summary: raw.summary.trim().to_string(),
        keywords: raw.keywords,
        feature_area: raw.feature_area.trim().to_ascii_lowercase(),
        dependency_tags: raw.dependency_tags,
        impact_level: raw.impact_level,
    })
}

/// Retry-wrapped, fallback-guaranteed classifier.
pub struct Classifier<'a> {
    analyzer: &'a dyn Analyzer,
    retry: RetryPolicy,
}

impl<'a> Classifier<'a> {
    pub fn new(analyzer: &'a dyn Analyzer, retry: RetryPolicy) -> Self {
        Self { analyzer, retry }
    }

    /// Classify one changed file. Infallible by construction: any analyzer
    /// or parse failure falls back to the deterministic classification.
    pub async fn classify(&self, vcs: &dyn Vcs, record: &ChangeRecord) -> Classification {
        let fallback = fallback_classification(&record.path, record.kind);

        let Some(payload) = self.payload(vcs, record) else {
            return fallback;
        };
        let prompt = build_classification_prompt(&record.path, record.kind, &payload);

        let response = match self.retry.run(|| self.analyzer.complete(&prompt)).await {
            Ok(r) => r,
            Err(e) => {
                debug!("Analyzer unavailable for {}: {e}", record.path);
                return fallback;
            }
        };

        match parse_classification(&record.path, &response) {
            Some(classification) => classification,
            None => {
                debug!("Unusable classification response for {}", record.path);
                fallback
            }
        }
    }

    /// Full content for new files, per-path diff for modified files.
    /// Returns `None` for directories, unreadable or empty payloads.
    fn payload(&self, vcs: &dyn Vcs, record: &ChangeRecord) -> Option<String> {
        let text = match record.kind {
            ChangeKind::Added => {
                let full = vcs.workdir().join(&record.path);
                if full.is_dir() {
                    return None;
                }
                std::fs::read_to_string(full).ok()?
            }
            ChangeKind::Modified => vcs.diff_path(&record.path).ok().flatten()?,
        };

        if text.trim().is_empty() {
            return None;
        }
        Some(cap_payload(text))
    }
}
