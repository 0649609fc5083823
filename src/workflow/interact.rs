//! Prompt-rendering adapter.
//!
//! The workflow core never renders menus itself; it asks an [`Interaction`]
//! for decisions. The terminal implementation uses dialoguer; tests supply
//! scripted implementations.

use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::group::CommitGroup;

/// One decision at the candidate-selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Commit the candidate group at this index.
    Group(usize),
    /// Commit an operator-composed subset of the remaining files.
    Manual(Vec<String>),
    /// End the session without further mutation.
    Exit,
}

/// One decision about a drafted commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Commit with this operator-edited message instead.
    Edit(String),
    /// Request an AI review of the staged selection, then re-offer.
    Review,
    Skip,
}

/// Decision source for the workflow's two suspension points.
pub trait Interaction {
    /// One-time safety confirmation before automatic mode mutates anything.
    fn confirm_auto_mode(&self) -> bool;

    /// Pick a candidate group, compose a manual batch, or exit.
    fn select(&self, candidates: &[CommitGroup], remaining: &[String]) -> Selection;

    /// Judge a drafted message for the selected files.
    fn verdict(&self, message: &str, files: &[String]) -> Verdict;
}

/// Terminal implementation over dialoguer.
///
/// Any prompt failure (for example a non-interactive terminal) is treated
/// as a decline or exit, never a panic.
pub struct TerminalPrompt;

impl Interaction for TerminalPrompt {
    fn confirm_auto_mode(&self) -> bool {
        Confirm::new()
            .with_prompt(
                "Auto mode will group, generate messages, and commit without further prompts. Proceed?",
            )
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn select(&self, candidates: &[CommitGroup], remaining: &[String]) -> Selection {
        let mut items: Vec<String> = Vec::new();
        for group in candidates {
            if group.files.len() > 1 {
                items.push(format!(
                    "Group ({}): commit {} related files",
                    group.label,
                    group.files.len()
                ));
            } else {
                items.push(format!("Single: {}", group.files[0]));
            }
        }
        items.push("Manual: choose files yourself".to_string());
        items.push("Exit".to_string());

        let choice = Select::new()
            .with_prompt("Select a commit action")
            .items(&items)
            .default(0)
            .interact();

        let Ok(index) = choice else { return Selection::Exit };

        if index < candidates.len() {
            Selection::Group(index)
        } else if index == candidates.len() {
            let picked = MultiSelect::new()
                .with_prompt("Select files for this commit")
                .items(remaining)
                .interact()
                .unwrap_or_default();
            Selection::Manual(picked.into_iter().map(|i| remaining[i].clone()).collect())
        } else {
            Selection::Exit
        }
    }

    fn verdict(&self, message: &str, files: &[String]) -> Verdict {
        println!("\nSuggested commit message:\n{message}");
        println!("Files included:");
        for f in files {
            println!("  - {f}");
        }

        let choice = Select::new()
            .with_prompt("Apply this commit?")
            .items(&["Yes", "Edit", "Get AI review", "Skip"])
            .default(0)
            .interact();

        match choice {
            Ok(0) => Verdict::Accept,
            Ok(1) => {
                let edited = Input::<String>::new()
                    .with_prompt("Edit the message")
                    .with_initial_text(message)
                    .interact_text();
                match edited {
                    Ok(text) if !text.trim().is_empty() => Verdict::Edit(text),
                    _ => Verdict::Skip,
                }
            }
            Ok(2) => Verdict::Review,
            _ => Verdict::Skip,
        }
    }
}
