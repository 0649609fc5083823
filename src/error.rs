//! Error types for commitflow modules using thiserror.

use thiserror::Error;

/// Fatal pre-mutation errors: unmet prerequisites abort the process
/// with a non-zero exit status before anything is staged or committed.
#[derive(Error, Debug)]
pub enum PrerequisiteError {
    #[error("git executable not found in PATH. Install git and try again")]
    GitNotInstalled,

    #[error("'{0}' is not a git repository")]
    NotARepository(String),

    #[error(
        "Ollama CLI not found. Install from https://ollama.com and pull a model with: ollama pull mistral-nemo"
    )]
    OllamaNotInstalled,

    #[error("Ollama is installed but not reachable (is the server running?): {0}")]
    OllamaUnreachable(String),
}

/// Errors from version-control operations through the `Vcs` trait.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to query working-tree status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to stage paths: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to unstage paths: {0}")]
    UnstagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error("Failed to resolve reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),
}

/// An unexpected status-query failure during a scan.
///
/// An empty scan result is not an error; this only wraps genuine
/// query failures.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Working-tree scan failed: {0}")]
    QueryFailed(#[source] GitError),
}

/// Errors from the Ollama analyzer subprocess.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Failed to spawn ollama process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Ollama process timed out after {0} seconds")]
    Timeout(u64),

    #[error("Ollama exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("Ollama returned invalid JSON: {0}")]
    InvalidJson(String),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<AnalyzerError>),
}

/// Errors from staging and committing a selected batch.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("No files selected for commit")]
    EmptySelection,

    #[error("Staging failed: {0}")]
    StagingFailed(#[source] GitError),

    #[error("Commit failed: {0}")]
    CommitFailed(#[source] GitError),
}
