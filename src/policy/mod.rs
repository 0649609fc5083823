//! Deterministic auto-commit passes.
//!
//! Three ordered, mutually exclusive passes commit obvious categories
//! before any classification happens: deletions, dependency lock files,
//! and binary image assets. Passes inspect only path and name, never
//! content, and each removes its matched files from the pool.

use tracing::info;

use crate::classify::rules::{is_image_asset, is_lock_file};
use crate::context::Console;
use crate::git::{Vcs, stage_and_commit};
use crate::scan::{ChangeKind, ChangeRecord, Scan};

/// Fixed message for the cleanup pass.
pub const CLEANUP_MESSAGE: &str = "refactor(cleanup): remove deleted files";

/// Fixed message for the dependency pass.
pub const DEPENDENCY_MESSAGE: &str = "chore(deps): update dependencies";

/// One auto-commit made by a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassCommit {
    pub message: String,
    pub files: Vec<String>,
}

/// Outcome of running the passes over one scan.
#[derive(Debug, Default)]
pub struct PolicyOutcome {
    /// Commits actually created, in pass order.
    pub commits: Vec<PassCommit>,
    /// Records left for classification after all passes claimed theirs.
    pub remainder: Vec<ChangeRecord>,
}

/// Partitioned view of one scan, before any commit is attempted.
///
/// Pure and deterministic; exposed separately so the pass selection can be
/// tested without a repository.
#[derive(Debug, PartialEq, Eq)]
pub struct PassPlan {
    pub deleted: Vec<String>,
    pub dependencies: Vec<String>,
    pub new_assets: Vec<String>,
    pub updated_assets: Vec<String>,
    pub remainder: Vec<ChangeRecord>,
}

/// Partition a scan into the pass pools.
///
/// Earlier passes claim first: a deleted path never reaches the dependency
/// or asset pools, and a lock file never reaches the asset pool.
pub fn plan_passes(scan: &Scan) -> PassPlan {
    let deleted = scan.deleted.clone();

    let mut dependencies = Vec::new();
    let mut new_assets = Vec::new();
    let mut updated_assets = Vec::new();
    let mut remainder = Vec::new();

    for record in &scan.records {
        if is_lock_file(&record.path) {
            dependencies.push(record.path.clone());
        } else if is_image_asset(&record.path) {
            match record.kind {
                ChangeKind::Added => new_assets.push(record.path.clone()),
                ChangeKind::Modified => updated_assets.push(record.path.clone()),
            }
        } else {
            remainder.push(record.clone());
        }
    }

    PassPlan { deleted, dependencies, new_assets, updated_assets, remainder }
}

/// Run the three passes, committing each non-empty batch immediately.
///
/// A failed batch is reported and its files stay uncommitted; the next
/// scan picks them up again. Failures never abort the workflow.
pub fn run_passes(vcs: &dyn Vcs, console: &Console, scan: &Scan) -> PolicyOutcome {
    let plan = plan_passes(scan);
    let mut commits = Vec::new();

    let mut batch = |files: Vec<String>, message: String| {
        if files.is_empty() {
            return;
        }
        console.info(&format!("Auto-committing {} file(s): {message}", files.len()));
        for f in &files {
            console.info(&format!("  - {f}"));
        }
        match stage_and_commit(vcs, &files, &message) {
            Ok(()) => {
                info!(files = files.len(), %message, "auto-commit pass succeeded");
                commits.push(PassCommit { message, files });
            }
            Err(e) => console.warn(&format!("Auto-commit failed, files left pending: {e}")),
        }
    };

    batch(plan.deleted, CLEANUP_MESSAGE.to_string());
    batch(plan.dependencies, DEPENDENCY_MESSAGE.to_string());
    batch(
        plan.new_assets.clone(),
        format!("chore(assets): add {} new image(s)", plan.new_assets.len()),
    );
    batch(
        plan.updated_assets.clone(),
        format!("chore(assets): update {} image(s)", plan.updated_assets.len()),
    );

    PolicyOutcome { commits, remainder: plan.remainder }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, kind: ChangeKind) -> ChangeRecord {
        ChangeRecord { path: path.to_string(), kind }
    }

    fn scan_of(records: Vec<ChangeRecord>, deleted: Vec<&str>) -> Scan {
        Scan { records, deleted: deleted.into_iter().map(String::from).collect() }
    }

    #[test]
    fn test_plan_empty_scan_has_empty_pools() {
        let plan = plan_passes(&Scan::default());
        assert!(plan.deleted.is_empty());
        assert!(plan.dependencies.is_empty());
        assert!(plan.new_assets.is_empty());
        assert!(plan.updated_assets.is_empty());
        assert!(plan.remainder.is_empty());
    }

    #[test]
    fn test_plan_claims_lock_files_before_classification() {
        let scan = scan_of(
            vec![
                record("src/a.ts", ChangeKind::Modified),
                record("yarn.lock", ChangeKind::Modified),
            ],
            vec![],
        );
        let plan = plan_passes(&scan);
        assert_eq!(plan.dependencies, vec!["yarn.lock"]);
        assert_eq!(plan.remainder.len(), 1);
        assert_eq!(plan.remainder[0].path, "src/a.ts");
    }

    #[test]
    fn test_plan_splits_assets_by_new_and_updated() {
        let scan = scan_of(
            vec![
                record("assets/new.png", ChangeKind::Added),
                record("assets/old.jpg", ChangeKind::Modified),
            ],
            vec![],
        );
        let plan = plan_passes(&scan);
        assert_eq!(plan.new_assets, vec!["assets/new.png"]);
        assert_eq!(plan.updated_assets, vec!["assets/old.jpg"]);
        assert!(plan.remainder.is_empty());
    }

    #[test]
    fn test_passes_are_mutually_exclusive() {
        // A deleted image never reaches the asset pool; a lock file never
        // reaches the asset pool even with an image-like directory.
        let scan = scan_of(
            vec![record("images/yarn.lock", ChangeKind::Modified)],
            vec!["old.png"],
        );
        let plan = plan_passes(&scan);
        assert_eq!(plan.deleted, vec!["old.png"]);
        assert_eq!(plan.dependencies, vec!["images/yarn.lock"]);
        assert!(plan.new_assets.is_empty());
        assert!(plan.updated_assets.is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let scan = scan_of(
            vec![
                record("a.png", ChangeKind::Added),
                record("Cargo.lock", ChangeKind::Modified),
                record("src/lib.rs", ChangeKind::Modified),
            ],
            vec!["dead.rs"],
        );
        assert_eq!(plan_passes(&scan), plan_passes(&scan));
    }
}
