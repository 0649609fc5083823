//! Read-only analyzer helpers: test-skeleton suggestions for uncommitted
//! work and change summaries for a branch range.
//!
//! Neither touches the index or creates commits; output goes straight to
//! the console.

use tracing::debug;

use crate::classify::classifier::cap_payload;
use crate::context::Console;
use crate::error::{GitError, ScanError};
use crate::git::Vcs;
use crate::ollama::Analyzer;
use crate::ollama::retry::RetryPolicy;
use crate::scan;

/// Hours of commit history included as context in a range summary.
const RECENT_WINDOW_HOURS: i64 = 24;

fn build_test_prompt(diff: &str) -> String {
    format!(
        r#"You are an expert developer. The following uncommitted changes need test coverage.

Changes:
```diff
{diff}
```

Suggest test skeletons for these changes: name each test, state what it verifies, and sketch its arrange/act/assert steps. Use the conventions visible in the diff. Respond in plain text."#
    )
}

fn build_summary_prompt(base: &str, head: &str, diff: &str, recent: &[String]) -> String {
    let recent_section = if recent.is_empty() {
        String::new()
    } else {
        format!(
            "\nRecent commits on `{head}`:\n{}\n",
            recent.iter().map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n")
        )
    };

    format!(
        r#"You are an expert developer. Summarize the changes on branch `{head}` relative to `{base}` for a pull request description.
{recent_section}
Diff:
```diff
{diff}
```

Write a short title line, then a bulleted summary of what changed and why it matters. Respond in plain text."#
    )
}

/// Collect one combined diff of the uncommitted changes, optionally
/// restricted to a single path.
fn uncommitted_diff(vcs: &dyn Vcs, only: Option<&str>) -> Result<Option<String>, ScanError> {
    if let Some(path) = only {
        let diff = vcs.diff_path(path).map_err(ScanError::QueryFailed)?;
        return Ok(diff);
    }

    let scan = scan::scan(vcs)?;
    if scan.is_empty() {
        return Ok(None);
    }

    let mut combined = String::new();
    let paths = scan
        .records
        .iter()
        .map(|r| r.path.as_str())
        .chain(scan.deleted.iter().map(String::as_str));
    for path in paths {
        if let Ok(Some(diff)) = vcs.diff_path(path) {
            combined.push_str(&diff);
        }
    }

    Ok((!combined.trim().is_empty()).then_some(combined))
}

/// Print analyzer-suggested test skeletons for the uncommitted changes,
/// or for one file when `file` is given.
pub async fn print_test_suggestions(
    vcs: &dyn Vcs,
    analyzer: &dyn Analyzer,
    retry: &RetryPolicy,
    console: &Console,
    file: Option<&str>,
) -> Result<(), ScanError> {
    let Some(diff) = uncommitted_diff(vcs, file)? else {
        console.info("No uncommitted changes to suggest tests for.");
        return Ok(());
    };

    console.info("Analyzing uncommitted changes...");
    let prompt = build_test_prompt(&cap_payload(diff));
    match retry.run(|| analyzer.complete(&prompt)).await {
        Ok(response) => console.info(response.trim()),
        Err(e) => {
            debug!("Analyzer unavailable for test suggestions: {e}");
            console.warn("Test suggestions unavailable: the analyzer did not respond.");
        }
    }
    Ok(())
}

/// Print an analyzer-written summary of `base..head`, defaulting `head`
/// to the checked-out branch.
///
/// An unknown reference is an error; an empty range is not.
pub async fn print_range_summary(
    vcs: &dyn Vcs,
    analyzer: &dyn Analyzer,
    retry: &RetryPolicy,
    console: &Console,
    base: &str,
    head: Option<&str>,
) -> Result<(), GitError> {
    let head = match head {
        Some(h) => h.to_string(),
        None => vcs.current_branch()?,
    };
    let Some(diff) = vcs.diff_range(base, &head)? else {
        console.info(&format!("No differences between '{base}' and '{head}'."));
        return Ok(());
    };

    let recent = vcs.log_since(RECENT_WINDOW_HOURS).unwrap_or_default();

    console.info(&format!("Summarizing '{base}..{head}'..."));
    let prompt = build_summary_prompt(base, &head, &cap_payload(diff), &recent);
    match retry.run(|| analyzer.complete(&prompt)).await {
        Ok(response) => console.info(response.trim()),
        Err(e) => {
            debug!("Analyzer unavailable for range summary: {e}");
            console.warn("Summary unavailable: the analyzer did not respond.");
        }
    }
    Ok(())
}
