//! Candidate commit grouping.
//!
//! Turns per-file classifications into an ordered list of candidate commit
//! groups. `feature_area` is the primary grouping key; pattern and
//! dependency tags are secondary, used only to fold otherwise-singleton
//! files together. In automatic mode the output is an exact partition of
//! the classified pool; in interactive mode the groups are suggestions.

use std::collections::{BTreeMap, BTreeSet};

use crate::classify::Classification;

/// Why a candidate group exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Files sharing a feature area.
    Feature,
    /// Files folded together by a shared pattern/dependency tag.
    Pattern,
    /// Operator-composed subset.
    Manual,
    /// A file nothing else claimed.
    Singleton,
}

/// A proposed set of files for one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitGroup {
    pub label: String,
    pub files: Vec<String>,
    pub provenance: Provenance,
}

impl CommitGroup {
    /// Operator-composed group from an arbitrary subset.
    pub fn manual(files: Vec<String>) -> Self {
        Self { label: "manual selection".to_string(), files, provenance: Provenance::Manual }
    }
}

/// Compute the ordered candidate groups for one classified pool.
///
/// Output invariant (automatic mode relies on it): every classified file
/// appears in exactly one group, and the union of all groups equals the
/// classified set.
pub fn build_groups(classifications: &[Classification]) -> Vec<CommitGroup> {
    // Primary partition by feature area.
    let mut by_feature: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for c in classifications {
        by_feature.entry(c.feature_area.as_str()).or_default().push(c.path.as_str());
    }
    for files in by_feature.values_mut() {
        files.sort_unstable();
    }

    // Secondary partition: every pattern and dependency tag a file carries.
    let mut by_tag: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for c in classifications {
        for tag in c.keywords.iter().chain(c.dependency_tags.iter()) {
            let members = by_tag.entry(tag.as_str()).or_default();
            if !members.contains(&c.path.as_str()) {
                members.push(c.path.as_str());
            }
        }
    }
    for files in by_tag.values_mut() {
        files.sort_unstable();
    }

    let mut groups = Vec::new();
    let mut placed: BTreeSet<&str> = BTreeSet::new();

    // Multi-member feature groups first: descending size, ties broken by
    // ascending first-file path.
    let mut feature_groups: Vec<(&str, &Vec<&str>)> =
        by_feature.iter().filter(|(_, files)| files.len() > 1).map(|(k, v)| (*k, v)).collect();
    feature_groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.1[0].cmp(&b.1[0])));

    for (area, files) in feature_groups {
        placed.extend(files.iter().copied());
        groups.push(CommitGroup {
            label: area.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
            provenance: Provenance::Feature,
        });
    }

    // Try to fold each leftover singleton into a pattern group that still
    // has more than one unplaced member; emit that group once.
    let mut singles: Vec<&Classification> =
        classifications.iter().filter(|c| !placed.contains(c.path.as_str())).collect();
    singles.sort_by(|a, b| a.path.cmp(&b.path));

    for c in singles {
        if placed.contains(c.path.as_str()) {
            continue;
        }
        let folded = c.keywords.iter().chain(c.dependency_tags.iter()).find_map(|tag| {
            let members: Vec<&str> = by_tag
                .get(tag.as_str())?
                .iter()
                .filter(|f| !placed.contains(**f))
                .copied()
                .collect();
            (members.len() > 1).then(|| (tag.as_str(), members))
        });

        if let Some((tag, members)) = folded {
            placed.extend(members.iter().copied());
            groups.push(CommitGroup {
                label: tag.to_string(),
                files: members.iter().map(|f| f.to_string()).collect(),
                provenance: Provenance::Pattern,
            });
        }
    }

    // Whatever is still unplaced becomes an individual candidate.
    let mut leftovers: Vec<&str> = classifications
        .iter()
        .map(|c| c.path.as_str())
        .filter(|p| !placed.contains(*p))
        .collect();
    leftovers.sort_unstable();
    leftovers.dedup();

    for path in leftovers {
        groups.push(CommitGroup {
            label: path.to_string(),
            files: vec![path.to_string()],
            provenance: Provenance::Singleton,
        });
    }

    groups
}

/// Automatic-mode pick: the largest multi-file group (ties broken by
/// ascending first-file path), or the lexicographically first singleton.
pub fn select_automatic(groups: &[CommitGroup]) -> Option<&CommitGroup> {
    let best_multi = groups
        .iter()
        .filter(|g| g.files.len() > 1)
        .max_by(|a, b| a.files.len().cmp(&b.files.len()).then_with(|| b.files[0].cmp(&a.files[0])));

    best_multi.or_else(|| groups.iter().filter(|g| !g.files.is_empty()).min_by_key(|g| &g.files[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ImpactLevel;

    fn classification(path: &str, area: &str, keywords: &[&str]) -> Classification {
        Classification {
            path: path.to_string(),
            summary: format!("Update {path}"),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            feature_area: area.to_string(),
            dependency_tags: Vec::new(),
            impact_level: ImpactLevel::Low,
        }
    }

    #[test]
    fn test_feature_groups_come_first_largest_first() {
        let pool = vec![
            classification("auth/a.rs", "auth", &["auth"]),
            classification("auth/b.rs", "auth", &["auth"]),
            classification("ui/x.rs", "ui", &["ui"]),
            classification("ui/y.rs", "ui", &["ui"]),
            classification("ui/z.rs", "ui", &["ui"]),
        ];
        let groups = build_groups(&pool);
        assert_eq!(groups[0].label, "ui");
        assert_eq!(groups[0].files.len(), 3);
        assert_eq!(groups[1].label, "auth");
        assert!(groups.iter().all(|g| g.provenance == Provenance::Feature));
    }

    #[test]
    fn test_size_ties_break_by_first_file_path() {
        let pool = vec![
            classification("zeta/1.rs", "zeta", &[]),
            classification("zeta/2.rs", "zeta", &[]),
            classification("alpha/1.rs", "alpha", &[]),
            classification("alpha/2.rs", "alpha", &[]),
        ];
        let groups = build_groups(&pool);
        assert_eq!(groups[0].label, "alpha");
        assert_eq!(groups[1].label, "zeta");
    }

    #[test]
    fn test_singletons_fold_into_pattern_groups() {
        // Two files in different feature areas share a tag: neither forms a
        // feature group, so the tag folds them together.
        let pool = vec![
            classification("src/client.rs", "api", &["http"]),
            classification("src/server.rs", "backend", &["http"]),
        ];
        let groups = build_groups(&pool);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "http");
        assert_eq!(groups[0].provenance, Provenance::Pattern);
        assert_eq!(groups[0].files, vec!["src/client.rs", "src/server.rs"]);
    }

    #[test]
    fn test_unplaced_files_become_singletons() {
        let pool = vec![
            classification("a.rs", "one", &["x"]),
            classification("b.rs", "two", &["y"]),
        ];
        let groups = build_groups(&pool);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.provenance == Provenance::Singleton));
        assert!(groups.iter().all(|g| g.files.len() == 1));
    }

    #[test]
    fn test_output_is_exact_partition() {
        let pool = vec![
            classification("auth/a.rs", "auth", &["auth", "http"]),
            classification("auth/b.rs", "auth", &["auth"]),
            classification("net/c.rs", "net", &["http"]),
            classification("misc/d.rs", "misc", &["odd"]),
            classification("deps/e.rs", "deps", &["http"]),
        ];
        let groups = build_groups(&pool);

        let mut seen = std::collections::BTreeSet::new();
        for group in &groups {
            for file in &group.files {
                assert!(seen.insert(file.clone()), "{file} appears in two groups");
            }
        }
        let expected: std::collections::BTreeSet<String> =
            pool.iter().map(|c| c.path.clone()).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_shared_fallback_tags_group_only_when_identical() {
        // Two analyzer-failed files grouped only because their fallback
        // rules assigned the same area; nothing is fabricated.
        let a = classification("src/login.ts", "core", &["code"]);
        let b = classification("src/logout.ts", "core", &["code"]);
        let groups = build_groups(&[a, b]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].provenance, Provenance::Feature);

        let c = classification("src/login.ts", "core", &["code"]);
        let d = classification("docs/notes.md", "docs", &["docs"]);
        let groups = build_groups(&[c, d]);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.files.len() == 1));
    }

    #[test]
    fn test_select_automatic_prefers_largest_multi_group() {
        let pool = vec![
            classification("auth/a.rs", "auth", &[]),
            classification("auth/b.rs", "auth", &[]),
            classification("z.rs", "zed", &[]),
        ];
        let groups = build_groups(&pool);
        let pick = select_automatic(&groups).unwrap();
        assert_eq!(pick.label, "auth");
    }

    #[test]
    fn test_select_automatic_falls_back_to_first_path() {
        let pool = vec![
            classification("m.rs", "one", &[]),
            classification("a.rs", "two", &[]),
        ];
        let groups = build_groups(&pool);
        let pick = select_automatic(&groups).unwrap();
        assert_eq!(pick.files, vec!["a.rs"]);
    }

    #[test]
    fn test_select_automatic_empty_pool() {
        assert!(select_automatic(&[]).is_none());
    }
}
