//! `Vcs` implementation backed by git2.

use std::path::{Path, PathBuf};

use git2::{
    Delta, Diff, DiffFormat, DiffOptions, ErrorCode, ObjectType, Repository, Status,
    StatusOptions, Tree,
};
use tracing::warn;

use crate::error::GitError;
use crate::git::vcs::{StatusEntry, StatusKind, Vcs};

/// Repository handle implementing the [`Vcs`] collaborator interface.
pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Open the repository at `path`.
    ///
    /// Bare repositories are rejected: the engine operates on a working tree.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::open(path).map_err(GitError::OpenRepository)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| {
                GitError::OpenRepository(git2::Error::from_str("repository has no working tree"))
            })?
            .to_path_buf();
        Ok(Self { repo, workdir })
    }

    /// Resolve the HEAD tree, distinguishing empty-repo states from real failures.
    ///
    /// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
    fn head_tree(&self) -> Result<Option<Tree<'_>>, GitError> {
        let head = match self.repo.head() {
            Ok(r) => r,
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(GitError::DiffFailed(e)),
        };
        let tree = head.peel_to_tree().map_err(GitError::DiffFailed)?;
        Ok(Some(tree))
    }

    /// Resolve an arbitrary revision (branch, tag, or hash) to its tree.
    fn resolve_tree(&self, rev: &str) -> Result<Tree<'_>, GitError> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|e| GitError::ReferenceNotFound(rev.to_string(), e))?;
        let peeled = object
            .peel(ObjectType::Tree)
            .map_err(|e| GitError::ReferenceNotFound(rev.to_string(), e))?;
        self.repo
            .find_tree(peeled.id())
            .map_err(|e| GitError::ReferenceNotFound(rev.to_string(), e))
    }

    /// HEAD commit, or `None` on an unborn branch.
    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>, GitError> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit().map_err(GitError::CommitFailed)?;
                Ok(Some(commit))
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(GitError::CommitFailed(e)),
        }
    }
}

/// Render a diff as unified patch text.
fn diff_to_text(diff: &Diff<'_>) -> String {
    let mut text = String::new();
    if let Err(e) = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
        true
    }) {
        warn!("Failed to render diff text: {e}");
    }
    text
}

/// Map a raw status bitfield to the entry kind, if the path is of interest.
fn classify_status(status: Status) -> Option<StatusKind> {
    if status.contains(Status::WT_DELETED) || status.contains(Status::INDEX_DELETED) {
        return Some(StatusKind::Deleted);
    }
    if status.contains(Status::WT_RENAMED) || status.contains(Status::INDEX_RENAMED) {
        // Old path is filled in by the caller from the delta.
        return Some(StatusKind::Renamed { from: String::new() });
    }
    if status.contains(Status::WT_NEW) || status.contains(Status::INDEX_NEW) {
        return Some(StatusKind::Untracked);
    }
    if status.intersects(
        Status::WT_MODIFIED
            | Status::INDEX_MODIFIED
            | Status::WT_TYPECHANGE
            | Status::INDEX_TYPECHANGE
            | Status::CONFLICTED,
    ) {
        return Some(StatusKind::Modified);
    }
    None
}

impl Vcs for GitRepo {
    fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .renames_head_to_index(true)
            .renames_index_to_workdir(true);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(GitError::StatusFailed)?;

        let mut entries = Vec::new();
        for entry in statuses.iter() {
            let Some(kind) = classify_status(entry.status()) else {
                continue;
            };

            let delta = entry.index_to_workdir().or_else(|| entry.head_to_index());
            let path = delta
                .as_ref()
                .and_then(|d| d.new_file().path())
                .map(|p| p.to_string_lossy().to_string())
                .or_else(|| entry.path().map(str::to_string));
            let Some(path) = path else { continue };

            let kind = match kind {
                StatusKind::Renamed { .. } => {
                    let from = delta
                        .filter(|d| d.status() == Delta::Renamed)
                        .and_then(|d| d.old_file().path())
                        .map(|p| p.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.clone());
                    StatusKind::Renamed { from }
                }
                other => other,
            };

            entries.push(StatusEntry { path, kind });
        }

        Ok(entries)
    }

    fn diff_path(&self, path: &str) -> Result<Option<String>, GitError> {
        let head_tree = self.head_tree()?;

        let mut staged_opts = DiffOptions::new();
        staged_opts.pathspec(path);
        let staged = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut staged_opts))
            .map_err(GitError::DiffFailed)?;

        let mut unstaged_opts = DiffOptions::new();
        unstaged_opts
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .pathspec(path);
        let unstaged = self
            .repo
            .diff_index_to_workdir(None, Some(&mut unstaged_opts))
            .map_err(GitError::DiffFailed)?;

        let mut text = diff_to_text(&staged);
        text.push_str(&diff_to_text(&unstaged));
        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }

    fn diff_staged(&self) -> Result<Option<String>, GitError> {
        let head_tree = self.head_tree()?;
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(GitError::DiffFailed)?;
        let text = diff_to_text(&diff);
        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }

    fn diff_range(&self, base: &str, head: &str) -> Result<Option<String>, GitError> {
        let base_tree = self.resolve_tree(base)?;
        let head_tree = self.resolve_tree(head)?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)
            .map_err(GitError::DiffFailed)?;
        let text = diff_to_text(&diff);
        Ok(if text.trim().is_empty() { None } else { Some(text) })
    }

    fn stage(&self, paths: &[String]) -> Result<(), GitError> {
        let mut index = self.repo.index().map_err(GitError::StagingFailed)?;
        for path in paths {
            let rel = Path::new(path);
            if self.workdir.join(rel).exists() {
                index.add_path(rel).map_err(GitError::StagingFailed)?;
            } else {
                // Deleted files are staged as removals.
                index.remove_path(rel).map_err(GitError::StagingFailed)?;
            }
        }
        index.write().map_err(GitError::StagingFailed)
    }

    fn unstage(&self, paths: &[String]) -> Result<(), GitError> {
        match self.repo.head() {
            Ok(head) => {
                let target = head
                    .peel(ObjectType::Commit)
                    .map_err(GitError::UnstagingFailed)?;
                self.repo
                    .reset_default(Some(&target), paths.iter().map(String::as_str))
                    .map_err(GitError::UnstagingFailed)
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                // No HEAD yet: everything staged is new, drop it from the index.
                let mut index = self.repo.index().map_err(GitError::UnstagingFailed)?;
                for path in paths {
                    let _ = index.remove_path(Path::new(path));
                }
                index.write().map_err(GitError::UnstagingFailed)
            }
            Err(e) => Err(GitError::UnstagingFailed(e)),
        }
    }

    fn unstage_all(&self) -> Result<(), GitError> {
        match self.repo.head() {
            Ok(head) => {
                let target = head
                    .peel(ObjectType::Commit)
                    .map_err(GitError::UnstagingFailed)?;
                self.repo
                    .reset_default(Some(&target), ["*"])
                    .map_err(GitError::UnstagingFailed)
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                let mut index = self.repo.index().map_err(GitError::UnstagingFailed)?;
                index.clear().map_err(GitError::UnstagingFailed)?;
                index.write().map_err(GitError::UnstagingFailed)
            }
            Err(e) => Err(GitError::UnstagingFailed(e)),
        }
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        let mut index = self.repo.index().map_err(GitError::CommitFailed)?;
        let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
        let tree = self.repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

        let sig = self.repo.signature().map_err(GitError::ConfigError)?;

        let parent = self.head_commit()?;
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(GitError::CommitFailed)?;
        Ok(())
    }

    fn current_branch(&self) -> Result<String, GitError> {
        match self.repo.head() {
            Ok(head) => Ok(head.shorthand().unwrap_or("HEAD").to_string()),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok("HEAD".to_string())
            }
            Err(e) => Err(GitError::ReferenceNotFound("HEAD".to_string(), e)),
        }
    }

    fn log_since(&self, hours: i64) -> Result<Vec<String>, GitError> {
        if self.head_commit()?.is_none() {
            return Ok(Vec::new());
        }
        let cutoff = (chrono::Utc::now() - chrono::Duration::hours(hours)).timestamp();

        let mut walk = self.repo.revwalk().map_err(GitError::RevwalkError)?;
        walk.push_head().map_err(GitError::RevwalkError)?;

        let mut subjects = Vec::new();
        for oid in walk {
            let oid = oid.map_err(GitError::RevwalkError)?;
            let commit = self.repo.find_commit(oid).map_err(GitError::RevwalkError)?;
            if commit.time().seconds() < cutoff {
                break;
            }
            subjects.push(commit.summary().unwrap_or("").to_string());
        }
        Ok(subjects)
    }

    fn workdir(&self) -> &Path {
        &self.workdir
    }
}
