//! Shared test utilities for integration tests.
//!
//! Not all helpers are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Repository, Signature};

use commitflow::error::{AnalyzerError, GitError};
use commitflow::git::{GitRepo, StatusEntry, Vcs};
use commitflow::ollama::Analyzer;
use commitflow::workflow::{Interaction, Selection, Verdict};
use commitflow::CommitGroup;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
}

impl TestRepo {
    /// Create a repository with user config and one initial empty commit.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();

        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .expect("Failed to create initial commit");

        Self { dir }
    }

    /// Open a fresh `Vcs` handle onto this repository.
    pub fn vcs(&self) -> GitRepo {
        GitRepo::open(self.dir.path()).expect("Failed to open test repo")
    }

    /// Write a file (creating parent directories) without staging it.
    pub fn write(&self, path: &str, content: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
    }

    /// Write a file and commit it, so it is tracked and clean.
    pub fn write_committed(&self, path: &str, content: &str) {
        self.write(path, content);
        let vcs = self.vcs();
        vcs.stage(&[path.to_string()]).unwrap();
        vcs.commit(&format!("add {path}")).unwrap();
    }

    /// Delete a tracked file from the working tree.
    pub fn delete(&self, path: &str) {
        std::fs::remove_file(self.dir.path().join(path)).unwrap();
    }

    /// Commit subjects, newest first.
    pub fn commit_messages(&self) -> Vec<String> {
        let repo = Repository::open(self.dir.path()).unwrap();
        let mut walk = repo.revwalk().unwrap();
        walk.push_head().unwrap();
        walk.map(|oid| {
            let commit = repo.find_commit(oid.unwrap()).unwrap();
            commit.summary().unwrap_or("").to_string()
        })
        .collect()
    }
}

/// Analyzer that answers by prompt shape: classification, message, or
/// review, always successfully.
pub struct CannedAnalyzer;

#[async_trait]
impl Analyzer for CannedAnalyzer {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError> {
        if prompt.contains("commit_message") {
            Ok(r#"{"commit_message": "feat(app): scripted change"}"#.to_string())
        } else if prompt.contains("review_comments") {
            Ok(r#"{"review_comments": ["message matches the change"]}"#.to_string())
        } else {
            Ok(concat!(
                r#"{"summary": "scripted change", "keywords": ["app"], "#,
                r#""feature_area": "app", "dependency_tags": [], "impact_level": "low"}"#
            )
            .to_string())
        }
    }
}

/// Analyzer that never responds, forcing every deterministic fallback.
pub struct DownAnalyzer;

#[async_trait]
impl Analyzer for DownAnalyzer {
    async fn complete(&self, _prompt: &str) -> Result<String, AnalyzerError> {
        Err(AnalyzerError::Timeout(0))
    }
}

/// Interaction playing back queued decisions; an empty queue exits/skips.
pub struct ScriptedInteraction {
    pub confirm: bool,
    selections: Mutex<VecDeque<Selection>>,
    verdicts: Mutex<VecDeque<Verdict>>,
}

impl ScriptedInteraction {
    pub fn new(selections: Vec<Selection>, verdicts: Vec<Verdict>) -> Self {
        Self {
            confirm: true,
            selections: Mutex::new(selections.into()),
            verdicts: Mutex::new(verdicts.into()),
        }
    }

    pub fn declining() -> Self {
        let mut s = Self::new(vec![], vec![]);
        s.confirm = false;
        s
    }
}

impl Interaction for ScriptedInteraction {
    fn confirm_auto_mode(&self) -> bool {
        self.confirm
    }

    fn select(&self, _candidates: &[CommitGroup], _remaining: &[String]) -> Selection {
        self.selections.lock().unwrap().pop_front().unwrap_or(Selection::Exit)
    }

    fn verdict(&self, _message: &str, _files: &[String]) -> Verdict {
        self.verdicts.lock().unwrap().pop_front().unwrap_or(Verdict::Skip)
    }
}

/// `Vcs` wrapper whose first `failures` commits fail, for rollback tests.
pub struct FlakyCommitVcs<'a> {
    inner: &'a GitRepo,
    failures: Cell<u32>,
}

impl<'a> FlakyCommitVcs<'a> {
    pub fn new(inner: &'a GitRepo, failures: u32) -> Self {
        Self { inner, failures: Cell::new(failures) }
    }
}

impl Vcs for FlakyCommitVcs<'_> {
    fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        self.inner.status()
    }
    fn diff_path(&self, path: &str) -> Result<Option<String>, GitError> {
        self.inner.diff_path(path)
    }
    fn diff_staged(&self) -> Result<Option<String>, GitError> {
        self.inner.diff_staged()
    }
    fn diff_range(&self, base: &str, head: &str) -> Result<Option<String>, GitError> {
        self.inner.diff_range(base, head)
    }
    fn stage(&self, paths: &[String]) -> Result<(), GitError> {
        self.inner.stage(paths)
    }
    fn unstage(&self, paths: &[String]) -> Result<(), GitError> {
        self.inner.unstage(paths)
    }
    fn unstage_all(&self) -> Result<(), GitError> {
        self.inner.unstage_all()
    }
    fn commit(&self, message: &str) -> Result<(), GitError> {
        let remaining = self.failures.get();
        if remaining > 0 {
            self.failures.set(remaining - 1);
            return Err(GitError::CommitFailed(git2::Error::from_str(
                "simulated commit failure",
            )));
        }
        self.inner.commit(message)
    }
    fn current_branch(&self) -> Result<String, GitError> {
        self.inner.current_branch()
    }
    fn log_since(&self, hours: i64) -> Result<Vec<String>, GitError> {
        self.inner.log_since(hours)
    }
    fn workdir(&self) -> &Path {
        self.inner.workdir()
    }
}
