//! commitflow - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commitflow::git::GitRepo;
use commitflow::ollama::subprocess::check_ollama_ready;
use commitflow::ollama::OllamaCli;
use commitflow::ollama::retry::RetryPolicy;
use commitflow::summary::{print_range_summary, print_test_suggestions};
use commitflow::workflow::{CommitWorkflow, TerminalPrompt, WorkflowConfig};
use commitflow::{Console, Outcome, PrerequisiteError};

/// Batch working-tree changes into clean, well-scoped commits with AI help.
#[derive(Parser, Debug)]
#[command(name = "commitflow")]
#[command(about = "Batch working-tree changes into clean, well-scoped commits")]
#[command(version)]
struct Cli {
    /// Path to the git repository
    #[arg(long, default_value = ".", global = true)]
    repo_path: PathBuf,

    /// Append diagnostic logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the commit workflow until the tree is clean (default)
    Commit {
        /// Commit without per-batch prompts, after one confirmation
        #[arg(long)]
        auto: bool,

        /// Leave the staged set untouched at startup
        #[arg(long)]
        skip_unstage: bool,

        /// Print a branch summary once the tree is clean
        #[arg(long)]
        summarize_after: bool,

        /// Base branch for the post-run summary
        #[arg(long, default_value = "main")]
        base_branch: String,
    },
    /// Suggest test skeletons for the uncommitted changes
    Test {
        /// Restrict the suggestions to one file's changes
        #[arg(long)]
        file: Option<String>,
    },
    /// Summarize the changes on this branch relative to a base
    Summarize {
        /// Base branch or revision to compare against
        #[arg(long, default_value = "main")]
        base: String,

        /// Head branch or revision (defaults to the checked-out branch)
        #[arg(long)]
        head: Option<String>,
    },
}

fn init_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("commitflow=info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Could not open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Check prerequisites and open the repository. Any failure here aborts
/// before a single byte of repository state changes.
async fn open_checked(repo_path: &PathBuf) -> Result<GitRepo, PrerequisiteError> {
    if which::which("git").is_err() {
        return Err(PrerequisiteError::GitNotInstalled);
    }

    let repo = GitRepo::open(repo_path)
        .map_err(|_| PrerequisiteError::NotARepository(repo_path.display().to_string()))?;

    check_ollama_ready().await?;
    Ok(repo)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.log_file.as_ref())?;

    let repo = open_checked(&cli.repo_path).await?;
    let analyzer = OllamaCli::from_env();
    let console = Console::terminal();
    let retry = RetryPolicy::default();

    let default = Command::Commit {
        auto: false,
        skip_unstage: false,
        summarize_after: false,
        base_branch: "main".to_string(),
    };
    match cli.command.unwrap_or(default) {
        Command::Commit { auto, skip_unstage, summarize_after, base_branch } => {
            let config = WorkflowConfig { auto, skip_initial_unstage: skip_unstage };
            let workflow = CommitWorkflow::new(
                &repo,
                &analyzer,
                &TerminalPrompt,
                &console,
                retry,
                config,
            );
            // Both terminal outcomes are clean exits; only unexpected
            // repository failures surface as errors.
            let report = workflow.run().await.context("Commit workflow failed")?;

            if summarize_after && report.outcome == Outcome::Done {
                print_range_summary(&repo, &analyzer, &retry, &console, &base_branch, None)
                    .await
                    .with_context(|| {
                        format!("Could not summarize changes since '{base_branch}'")
                    })?;
            }
            Ok(())
        }
        Command::Test { file } => {
            print_test_suggestions(&repo, &analyzer, &retry, &console, file.as_deref())
                .await
                .context("Could not analyze uncommitted changes")?;
            Ok(())
        }
        Command::Summarize { base, head } => {
            print_range_summary(&repo, &analyzer, &retry, &console, &base, head.as_deref())
                .await
                .with_context(|| format!("Could not summarize changes since '{base}'"))?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
