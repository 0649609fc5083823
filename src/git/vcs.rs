//! The `Vcs` trait: every version-control operation the engine consumes.
//!
//! The engine never talks to git directly; it goes through this trait so
//! tests can substitute failing or scripted implementations.

use std::path::Path;

use crate::error::GitError;

/// How a path shows up in the working-tree status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    /// Tracked file with staged or unstaged modifications.
    Modified,
    /// New file, untracked or staged-but-new.
    Untracked,
    /// Deleted from the working tree or index.
    Deleted,
    /// Renamed; `from` is the old path.
    Renamed { from: String },
}

/// One raw status entry as reported by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub path: String,
    pub kind: StatusKind,
}

/// Narrow version-control interface consumed by the engine.
///
/// Diff queries return `Ok(None)` for the benign "nothing to show" case;
/// `Err` is reserved for genuine query failures. Commits created through
/// this trait never run local verification hooks (libgit2 does not execute
/// them), matching the engine's always-`--no-verify` behavior.
pub trait Vcs {
    /// All current status entries, one per path.
    fn status(&self) -> Result<Vec<StatusEntry>, GitError>;

    /// Unified diff (staged + unstaged) for a single path.
    fn diff_path(&self, path: &str) -> Result<Option<String>, GitError>;

    /// Unified diff of the staged index against HEAD.
    fn diff_staged(&self) -> Result<Option<String>, GitError>;

    /// Unified diff between two revisions or branches.
    fn diff_range(&self, base: &str, head: &str) -> Result<Option<String>, GitError>;

    /// Stage exactly the given paths (handles deletions as removals).
    fn stage(&self, paths: &[String]) -> Result<(), GitError>;

    /// Unstage exactly the given paths, restoring the index to HEAD.
    fn unstage(&self, paths: &[String]) -> Result<(), GitError>;

    /// Unstage everything (`git reset` on the whole index).
    fn unstage_all(&self) -> Result<(), GitError>;

    /// Commit the staged index with the given message.
    fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Short name of the currently checked-out branch.
    fn current_branch(&self) -> Result<String, GitError>;

    /// Subject lines of commits reachable from HEAD made within the last
    /// `hours` hours, newest first. Empty on an unborn branch.
    fn log_since(&self, hours: i64) -> Result<Vec<String>, GitError>;

    /// Root of the working tree, for reading new-file content.
    fn workdir(&self) -> &Path;
}
