//! The top-level commit workflow state machine.

pub mod engine;
pub mod interact;
pub mod message;

pub use engine::{CommitWorkflow, CommittedBatch, Outcome, WorkflowConfig, WorkflowReport};
pub use interact::{Interaction, Selection, TerminalPrompt, Verdict};
