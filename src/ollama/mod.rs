//! Analysis/generation collaborator backed by the Ollama CLI.

pub mod json;
pub mod retry;
pub mod subprocess;

use async_trait::async_trait;

use crate::error::AnalyzerError;
use subprocess::run_ollama;

/// Narrow interface to the analysis/generation backend.
///
/// Implementations take a capped text payload embedded in a task prompt and
/// return raw structured text. Callers are responsible for defensive
/// parsing; any parse failure is "no result", never fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError>;
}

/// Production analyzer spawning `ollama run <model>`.
pub struct OllamaCli {
    model: String,
}

impl OllamaCli {
    pub fn new(model: String) -> Self {
        Self { model }
    }

    /// Build from the environment (`COMMITFLOW_MODEL`, default `mistral-nemo`).
    pub fn from_env() -> Self {
        Self::new(subprocess::configured_model())
    }
}

#[async_trait]
impl Analyzer for OllamaCli {
    async fn complete(&self, prompt: &str) -> Result<String, AnalyzerError> {
        run_ollama(&self.model, prompt).await
    }
}
