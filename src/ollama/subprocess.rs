//! Ollama CLI spawning.

use std::env;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::error::{AnalyzerError, PrerequisiteError};

/// Default timeout for one Ollama generation (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable to override the default timeout.
const TIMEOUT_ENV_VAR: &str = "COMMITFLOW_OLLAMA_TIMEOUT";

/// Environment variable to select the model.
const MODEL_ENV_VAR: &str = "COMMITFLOW_MODEL";

/// Default model when none is configured.
const DEFAULT_MODEL: &str = "mistral-nemo";

/// Model name from the environment, or the default.
pub fn configured_model() -> String {
    match env::var(MODEL_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => DEFAULT_MODEL.to_string(),
    }
}

/// Timeout from the environment, or the default.
///
/// Logs a warning if the variable is set but not a positive integer.
fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Check that the Ollama CLI is installed and its server is reachable.
///
/// `ollama list` requires a running server, so a non-zero exit here
/// distinguishes "installed but not running" from "not installed".
pub async fn check_ollama_ready() -> Result<(), PrerequisiteError> {
    if which::which("ollama").is_err() {
        return Err(PrerequisiteError::OllamaNotInstalled);
    }

    let list = Command::new("ollama")
        .arg("list")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| PrerequisiteError::OllamaUnreachable(e.to_string()))?;

    if !list.status.success() {
        let stderr = String::from_utf8_lossy(&list.stderr).trim().to_string();
        return Err(PrerequisiteError::OllamaUnreachable(stderr));
    }

    Ok(())
}

/// Run one generation, feeding the prompt over stdin.
///
/// Prompts carry whole diffs, so stdin avoids argv length limits. The
/// subprocess is bounded by [`get_timeout`]; exceeding it returns
/// `AnalyzerError::Timeout`.
pub async fn run_ollama(model: &str, prompt: &str) -> Result<String, AnalyzerError> {
    let timeout_duration = get_timeout();
    let timeout_secs = timeout_duration.as_secs();

    let mut child = Command::new("ollama")
        .arg("run")
        .arg(model)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(AnalyzerError::SpawnFailed)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(AnalyzerError::SpawnFailed)?;
        // Dropping stdin closes the pipe so the model starts generating.
    }

    let output = timeout(timeout_duration, child.wait_with_output())
        .await
        .map_err(|_| AnalyzerError::Timeout(timeout_secs))?
        .map_err(AnalyzerError::SpawnFailed)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);
        return Err(AnalyzerError::NonZeroExit { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
