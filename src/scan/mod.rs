//! Working-tree change enumeration.
//!
//! A scan turns raw status entries into a deduplicated, deterministic set
//! of change records. Renames collapse to their destination path as
//! modifications; deleted paths are kept aside for the cleanup pass and
//! never enter classification.

use std::collections::BTreeSet;

use crate::error::ScanError;
use crate::git::{StatusKind, Vcs};

/// How a scanned file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// New, untracked content.
    Added,
    /// Tracked content with modifications (including rename destinations).
    Modified,
}

/// One path plus its change kind for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: String,
    pub kind: ChangeKind,
}

/// The complete result of one working-tree scan.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    /// Deduplicated records for added and modified paths, sorted by path.
    pub records: Vec<ChangeRecord>,
    /// Deleted paths, sorted, reserved for the cleanup pass.
    pub deleted: Vec<String>,
}

impl Scan {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.deleted.is_empty()
    }
}

/// Enumerate the current working-tree changes.
///
/// Each path appears at most once. An empty result means a clean tree and
/// is not an error; only an unexpected status-query failure produces
/// [`ScanError`].
pub fn scan(vcs: &dyn Vcs) -> Result<Scan, ScanError> {
    let entries = vcs.status().map_err(ScanError::QueryFailed)?;

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut records = Vec::new();
    let mut deleted = Vec::new();

    for entry in entries {
        match entry.kind {
            StatusKind::Deleted => {
                if seen.insert(entry.path.clone()) {
                    deleted.push(entry.path);
                }
            }
            StatusKind::Untracked => {
                if seen.insert(entry.path.clone()) {
                    records.push(ChangeRecord { path: entry.path, kind: ChangeKind::Added });
                }
            }
            StatusKind::Modified | StatusKind::Renamed { .. } => {
                if seen.insert(entry.path.clone()) {
                    records.push(ChangeRecord { path: entry.path, kind: ChangeKind::Modified });
                }
            }
        }
    }

    records.sort_by(|a, b| a.path.cmp(&b.path));
    deleted.sort();

    Ok(Scan { records, deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitError;
    use crate::git::StatusEntry;
    use std::path::Path;

    struct StubVcs {
        entries: Vec<StatusEntry>,
    }

    impl Vcs for StubVcs {
        fn status(&self) -> Result<Vec<StatusEntry>, GitError> {
            Ok(self.entries.clone())
        }
        fn diff_path(&self, _path: &str) -> Result<Option<String>, GitError> {
            Ok(None)
        }
        fn diff_staged(&self) -> Result<Option<String>, GitError> {
            Ok(None)
        }
        fn diff_range(&self, _base: &str, _head: &str) -> Result<Option<String>, GitError> {
            Ok(None)
        }
        fn stage(&self, _paths: &[String]) -> Result<(), GitError> {
            Ok(())
        }
        fn unstage(&self, _paths: &[String]) -> Result<(), GitError> {
            Ok(())
        }
        fn unstage_all(&self) -> Result<(), GitError> {
            Ok(())
        }
        fn commit(&self, _message: &str) -> Result<(), GitError> {
            Ok(())
        }
        fn current_branch(&self) -> Result<String, GitError> {
            Ok("main".to_string())
        }
        fn log_since(&self, _hours: i64) -> Result<Vec<String>, GitError> {
            Ok(Vec::new())
        }
        fn workdir(&self) -> &Path {
            Path::new(".")
        }
    }

    fn entry(path: &str, kind: StatusKind) -> StatusEntry {
        StatusEntry { path: path.to_string(), kind }
    }

    #[test]
    fn test_scan_empty_tree_is_not_an_error() {
        let vcs = StubVcs { entries: vec![] };
        let scan = scan(&vcs).unwrap();
        assert!(scan.is_empty());
    }

    #[test]
    fn test_scan_separates_deleted_from_records() {
        let vcs = StubVcs {
            entries: vec![
                entry("src/a.rs", StatusKind::Modified),
                entry("old.png", StatusKind::Deleted),
                entry("new.rs", StatusKind::Untracked),
            ],
        };
        let scan = scan(&vcs).unwrap();
        assert_eq!(scan.deleted, vec!["old.png"]);
        assert_eq!(scan.records.len(), 2);
        assert!(scan.records.iter().all(|r| r.path != "old.png"));
    }

    #[test]
    fn test_scan_collapses_rename_to_destination_modification() {
        let vcs = StubVcs {
            entries: vec![entry(
                "src/renamed.rs",
                StatusKind::Renamed { from: "src/original.rs".to_string() },
            )],
        };
        let scan = scan(&vcs).unwrap();
        assert_eq!(
            scan.records,
            vec![ChangeRecord { path: "src/renamed.rs".to_string(), kind: ChangeKind::Modified }]
        );
    }

    #[test]
    fn test_scan_deduplicates_paths() {
        let vcs = StubVcs {
            entries: vec![
                entry("src/a.rs", StatusKind::Modified),
                entry("src/a.rs", StatusKind::Untracked),
            ],
        };
        let scan = scan(&vcs).unwrap();
        assert_eq!(scan.records.len(), 1);
        assert_eq!(scan.records[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn test_scan_is_order_independent() {
        let forward = StubVcs {
            entries: vec![
                entry("b.rs", StatusKind::Modified),
                entry("a.rs", StatusKind::Untracked),
            ],
        };
        let backward = StubVcs {
            entries: vec![
                entry("a.rs", StatusKind::Untracked),
                entry("b.rs", StatusKind::Modified),
            ],
        };
        assert_eq!(scan(&forward).unwrap().records, scan(&backward).unwrap().records);
    }
}
