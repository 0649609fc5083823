//! Ordered path-categorization rules.
//!
//! One table drives both the auto-commit category predicates and the
//! deterministic fallback classification: each rule pairs a path predicate
//! with the feature area and tags it assigns. First match wins, and the
//! terminal catch-all guarantees every path matches something.

/// Base names committed by the dependency pass.
pub const LOCK_FILE_NAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Cargo.lock",
    "Gemfile.lock",
    "poetry.lock",
    "composer.lock",
    "go.sum",
];

/// Extensions committed by the asset pass.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "ico", "bmp"];

/// How a rule matches a path.
enum Predicate {
    /// Base name is exactly one of these.
    BaseName(&'static [&'static str]),
    /// Lower-cased extension is one of these.
    Extension(&'static [&'static str]),
    /// Any path segment equals one of these.
    Segment(&'static [&'static str]),
    /// Always matches; terminal catch-all.
    Any,
}

/// One categorization rule: predicate plus the tags it assigns.
pub struct Rule {
    predicate: Predicate,
    pub feature_area: &'static str,
    pub tags: &'static [&'static str],
}

/// The fixed rule table, in match order.
static RULES: &[Rule] = &[
    Rule {
        predicate: Predicate::BaseName(LOCK_FILE_NAMES),
        feature_area: "dependencies",
        tags: &["deps", "lockfile"],
    },
    Rule {
        predicate: Predicate::Extension(IMAGE_EXTENSIONS),
        feature_area: "assets",
        tags: &["assets", "images"],
    },
    Rule {
        predicate: Predicate::Segment(&["tests", "test", "__tests__", "spec"]),
        feature_area: "tests",
        tags: &["test"],
    },
    Rule {
        predicate: Predicate::Extension(&["md", "rst", "adoc", "txt"]),
        feature_area: "docs",
        tags: &["docs"],
    },
    Rule {
        predicate: Predicate::Segment(&[".github", ".gitlab", ".circleci", "ci"]),
        feature_area: "ci",
        tags: &["ci"],
    },
    Rule {
        predicate: Predicate::BaseName(&[
            "Dockerfile",
            "Makefile",
            "package.json",
            "Cargo.toml",
            "pyproject.toml",
            "build.gradle",
            "pom.xml",
        ]),
        feature_area: "build",
        tags: &["build", "config"],
    },
    Rule {
        predicate: Predicate::Extension(&["json", "toml", "yaml", "yml", "ini", "env"]),
        feature_area: "config",
        tags: &["config"],
    },
    Rule {
        predicate: Predicate::Extension(&["css", "scss", "sass", "less"]),
        feature_area: "styles",
        tags: &["ui", "styles"],
    },
    Rule {
        predicate: Predicate::Segment(&["components", "views", "pages", "ui"]),
        feature_area: "ui",
        tags: &["ui", "component"],
    },
    Rule {
        predicate: Predicate::Segment(&["api", "services", "handlers", "routes"]),
        feature_area: "api",
        tags: &["api"],
    },
    Rule {
        predicate: Predicate::Segment(&["scripts", "tools", "bin"]),
        feature_area: "tooling",
        tags: &["tooling", "scripts"],
    },
    Rule {
        predicate: Predicate::Extension(&[
            "rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "rb", "c", "cpp", "h",
        ]),
        feature_area: "core",
        tags: &["code"],
    },
    Rule {
        predicate: Predicate::Any,
        feature_area: "misc",
        tags: &["misc"],
    },
];

/// Base name of a path (the final segment).
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lower-cased extension of a path, if any.
pub fn extension(path: &str) -> Option<String> {
    let name = base_name(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        // Dotfiles like `.env` have no stem; treat the remainder as extension.
        return Some(ext.to_ascii_lowercase());
    }
    Some(ext.to_ascii_lowercase())
}

fn matches(predicate: &Predicate, path: &str) -> bool {
    match predicate {
        Predicate::BaseName(names) => names.contains(&base_name(path)),
        Predicate::Extension(exts) => {
            extension(path).is_some_and(|e| exts.contains(&e.as_str()))
        }
        Predicate::Segment(segments) => path
            .split(['/', '\\'])
            .any(|part| segments.contains(&part.to_ascii_lowercase().as_str())),
        Predicate::Any => true,
    }
}

/// First matching rule for a path. The catch-all makes this total.
pub fn match_rule(path: &str) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| matches(&rule.predicate, path))
        .unwrap_or(&RULES[RULES.len() - 1])
}

/// Whether the dependency pass claims this path.
pub fn is_lock_file(path: &str) -> bool {
    LOCK_FILE_NAMES.contains(&base_name(path))
}

/// Whether the asset pass claims this path.
pub fn is_image_asset(path: &str) -> bool {
    extension(path).is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}
