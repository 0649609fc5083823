//! commitflow - A CLI tool that batches working-tree changes into clean,
//! well-scoped commits.
//!
//! # Overview
//!
//! commitflow scans the working tree, auto-commits the obvious categories
//! (deletions, dependency lock files, image assets), classifies the rest
//! with a local Ollama model (falling back to deterministic path rules),
//! groups related files into candidate commits, and drives an interactive
//! or automatic commit loop until the tree is clean.

pub mod classify;
pub mod context;
pub mod error;
pub mod git;
pub mod group;
pub mod ollama;
pub mod policy;
pub mod scan;
pub mod summary;
pub mod workflow;

// Re-export commonly used types
pub use classify::{Classification, Classifier, ImpactLevel};
pub use context::Console;
pub use error::{AnalyzerError, CommitError, GitError, PrerequisiteError, ScanError};
pub use git::{GitRepo, Vcs};
pub use group::{CommitGroup, Provenance};
pub use ollama::{Analyzer, OllamaCli};
pub use ollama::retry::RetryPolicy;
pub use scan::{ChangeKind, ChangeRecord, Scan};
pub use workflow::{CommitWorkflow, Outcome, WorkflowConfig, WorkflowReport};
