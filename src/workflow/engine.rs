//! The workflow engine: scan, auto-commit, classify, group, select,
//! commit, repeat until the tree is clean or the operator exits.

use tracing::{debug, info};

use crate::classify::{Classification, Classifier};
use crate::context::Console;
use crate::error::ScanError;
use crate::git::Vcs;
use crate::group::{CommitGroup, build_groups, select_automatic};
use crate::ollama::Analyzer;
use crate::ollama::retry::RetryPolicy;
use crate::policy;
use crate::scan;
use crate::workflow::interact::{Interaction, Selection, Verdict};
use crate::workflow::message::{draft_message, fallback_message, review_selection};

/// Knobs set from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowConfig {
    /// Commit without per-batch prompts, after one upfront confirmation.
    pub auto: bool,
    /// Leave the staged set untouched at startup.
    pub skip_initial_unstage: bool,
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The working tree is clean.
    Done,
    /// The operator exited, declined auto mode, or commits stalled.
    Aborted,
}

/// One commit the workflow created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedBatch {
    pub message: String,
    pub files: Vec<String>,
}

/// End-of-session accounting: every originally changed file is either in
/// `committed` or listed in `pending`.
#[derive(Debug)]
pub struct WorkflowReport {
    pub outcome: Outcome,
    pub committed: Vec<CommittedBatch>,
    pub pending: Vec<String>,
}

enum Round {
    Committed,
    Exit,
}

/// Drives one commit session over a repository.
pub struct CommitWorkflow<'a> {
    vcs: &'a dyn Vcs,
    analyzer: &'a dyn Analyzer,
    interaction: &'a dyn Interaction,
    console: &'a Console,
    retry: RetryPolicy,
    config: WorkflowConfig,
}

impl<'a> CommitWorkflow<'a> {
    pub fn new(
        vcs: &'a dyn Vcs,
        analyzer: &'a dyn Analyzer,
        interaction: &'a dyn Interaction,
        console: &'a Console,
        retry: RetryPolicy,
        config: WorkflowConfig,
    ) -> Self {
        Self { vcs, analyzer, interaction, console, retry, config }
    }

    /// Run the session to a terminal state.
    ///
    /// Only an unexpected status-query failure is an error; everything else
    /// (analyzer outages, declined prompts, failed commits) resolves into
    /// the report.
    pub async fn run(&self) -> Result<WorkflowReport, ScanError> {
        let mut committed: Vec<CommittedBatch> = Vec::new();

        if self.config.auto && !self.interaction.confirm_auto_mode() {
            self.console.info("Auto mode declined; nothing was changed.");
            return self.finish(Outcome::Aborted, committed);
        }

        if !self.config.skip_initial_unstage
            && let Err(e) = self.vcs.unstage_all()
        {
            self.console.warn(&format!("Could not reset the staged set: {e}"));
        }

        loop {
            let scan = scan::scan(self.vcs)?;
            if scan.is_empty() {
                self.console.info("Working tree is clean.");
                return self.finish(Outcome::Done, committed);
            }

            let outcome = policy::run_passes(self.vcs, self.console, &scan);
            let auto_committed = !outcome.commits.is_empty();
            for commit in outcome.commits {
                committed.push(CommittedBatch { message: commit.message, files: commit.files });
            }
            if auto_committed {
                // Re-scan so pass commits and any external edits are
                // reflected before classification.
                continue;
            }

            if outcome.remainder.is_empty() {
                // The scan was non-empty but every file belonged to a pass
                // that failed to commit. Retrying would spin forever.
                self.console.warn("Remaining files could not be committed automatically.");
                return self.finish(Outcome::Aborted, committed);
            }

            let classifier = Classifier::new(self.analyzer, self.retry);
            let mut classifications: Vec<Classification> =
                Vec::with_capacity(outcome.remainder.len());
            for record in &outcome.remainder {
                self.console.info(&format!("Analyzing {}...", record.path));
                classifications.push(classifier.classify(self.vcs, record).await);
            }

            let groups = build_groups(&classifications);
            debug!(groups = groups.len(), files = classifications.len(), "candidates built");

            if self.config.auto {
                let Some(pick) = select_automatic(&groups) else {
                    return self.finish(Outcome::Done, committed);
                };
                if self.commit_selection(&pick.label, pick.files.clone(), &mut committed).await {
                    continue;
                }
                // Auto mode would re-select the same candidate; stop
                // instead of looping on a persistent failure.
                self.console.warn("Automatic commit failed; remaining files left pending.");
                return self.finish(Outcome::Aborted, committed);
            }

            let remaining: Vec<String> =
                classifications.iter().map(|c| c.path.clone()).collect();
            match self.interactive_round(&groups, &remaining, &mut committed).await {
                Round::Committed => continue,
                Round::Exit => {
                    if let Err(e) = self.vcs.unstage_all() {
                        self.console.warn(&format!("Could not reset the staged set: {e}"));
                    }
                    return self.finish(Outcome::Aborted, committed);
                }
            }
        }
    }

    /// One interactive selection round: keeps prompting over the same
    /// candidates until a commit lands or the operator exits.
    async fn interactive_round(
        &self,
        groups: &[CommitGroup],
        remaining: &[String],
        committed: &mut Vec<CommittedBatch>,
    ) -> Round {
        loop {
            match self.interaction.select(groups, remaining) {
                Selection::Exit => return Round::Exit,
                Selection::Group(index) => {
                    let Some(group) = groups.get(index) else {
                        continue;
                    };
                    if self.offer(&group.label, group.files.clone(), committed).await {
                        return Round::Committed;
                    }
                }
                Selection::Manual(files) => {
                    if files.is_empty() {
                        self.console.warn("No files selected.");
                        continue;
                    }
                    let group = CommitGroup::manual(files);
                    if self.offer(&group.label, group.files, committed).await {
                        return Round::Committed;
                    }
                }
            }
        }
    }

    /// Stage a selection, draft a message, and walk the operator through
    /// accept/edit/review/skip. Returns whether a commit landed; every
    /// non-commit path unstages the selection first.
    async fn offer(
        &self,
        label: &str,
        files: Vec<String>,
        committed: &mut Vec<CommittedBatch>,
    ) -> bool {
        let Some(diff) = self.stage_for_diff(&files) else {
            return false;
        };

        let mut message =
            draft_message(self.analyzer, &self.retry, label, &files, diff.as_deref()).await;

        loop {
            match self.interaction.verdict(&message, &files) {
                Verdict::Accept => break,
                Verdict::Edit(edited) => {
                    message = edited;
                    break;
                }
                Verdict::Review => {
                    match &diff {
                        Some(diff) => {
                            let comments =
                                review_selection(self.analyzer, &self.retry, &message, diff).await;
                            match comments {
                                Some(comments) => {
                                    self.console.info("Review comments:");
                                    for comment in comments {
                                        self.console.info(&format!("  - {comment}"));
                                    }
                                }
                                None => self.console.warn("Review unavailable."),
                            }
                        }
                        None => self.console.warn("Nothing staged to review."),
                    }
                }
                Verdict::Skip => {
                    let _ = self.vcs.unstage(&files);
                    return false;
                }
            }
        }

        self.commit_staged(&files, message, committed)
    }

    /// Auto-mode commit: stage, draft, commit, no prompts.
    async fn commit_selection(
        &self,
        label: &str,
        files: Vec<String>,
        committed: &mut Vec<CommittedBatch>,
    ) -> bool {
        let Some(diff) = self.stage_for_diff(&files) else {
            return false;
        };
        let message = if diff.is_some() {
            draft_message(self.analyzer, &self.retry, label, &files, diff.as_deref()).await
        } else {
            fallback_message(label, &files)
        };
        self.commit_staged(&files, message, committed)
    }

    /// Stage `files` and return their combined staged diff. `None` means
    /// staging failed and has been rolled back.
    fn stage_for_diff(&self, files: &[String]) -> Option<Option<String>> {
        if let Err(e) = self.vcs.stage(files) {
            let _ = self.vcs.unstage(files);
            self.console.warn(&format!("Could not stage selection: {e}"));
            return None;
        }
        Some(self.vcs.diff_staged().ok().flatten())
    }

    /// Commit the already-staged selection, rolling back on failure.
    fn commit_staged(
        &self,
        files: &[String],
        message: String,
        committed: &mut Vec<CommittedBatch>,
    ) -> bool {
        match self.vcs.commit(&message) {
            Ok(()) => {
                info!(files = files.len(), %message, "batch committed");
                self.console.info(&format!("Committed {} file(s): {message}", files.len()));
                committed.push(CommittedBatch { message, files: files.to_vec() });
                true
            }
            Err(e) => {
                let _ = self.vcs.unstage(files);
                self.console.warn(&format!("Commit failed, selection unstaged: {e}"));
                false
            }
        }
    }

    /// Build the report, listing whatever is still changed as pending.
    fn finish(
        &self,
        outcome: Outcome,
        committed: Vec<CommittedBatch>,
    ) -> Result<WorkflowReport, ScanError> {
        let scan = scan::scan(self.vcs)?;
        let mut pending: Vec<String> =
            scan.records.iter().map(|r| r.path.clone()).collect();
        pending.extend(scan.deleted.iter().cloned());
        pending.sort();

        if !pending.is_empty() {
            self.console.info(&format!("{} file(s) left uncommitted:", pending.len()));
            for path in &pending {
                self.console.info(&format!("  - {path}"));
            }
        }
        if !committed.is_empty() {
            self.console.info(&format!("Created {} commit(s) this session.", committed.len()));
        }

        Ok(WorkflowReport { outcome, committed, pending })
    }
}
