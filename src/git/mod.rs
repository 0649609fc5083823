//! Version-control collaborator: a narrow interface over the repository.

pub mod repo;
pub mod vcs;

pub use repo::GitRepo;
pub use vcs::{StatusEntry, StatusKind, Vcs};

use crate::error::CommitError;

/// Stage exactly `files` and commit them with `message`.
///
/// The index discipline is stage-then-commit-or-unstage: any failure rolls
/// the staged selection back before the error surfaces, so no mixed or
/// stale staged set survives across iterations.
pub fn stage_and_commit(vcs: &dyn Vcs, files: &[String], message: &str) -> Result<(), CommitError> {
    if files.is_empty() {
        return Err(CommitError::EmptySelection);
    }

    if let Err(e) = vcs.stage(files) {
        let _ = vcs.unstage(files);
        return Err(CommitError::StagingFailed(e));
    }

    if let Err(e) = vcs.commit(message) {
        let _ = vcs.unstage(files);
        return Err(CommitError::CommitFailed(e));
    }

    Ok(())
}
