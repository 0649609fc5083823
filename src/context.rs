//! Per-invocation execution context.
//!
//! Operator-facing output goes through an explicit [`Console`] constructed
//! once in `main` and passed to every component, instead of process-wide
//! print singletons. Diagnostic logging is tracing, configured separately.

use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum Sink {
    Terminal,
    Capture(Arc<Mutex<Vec<String>>>),
}

/// Output sink for messages the operator is meant to read.
#[derive(Clone)]
pub struct Console {
    sink: Sink,
}

impl Console {
    /// Console writing to stdout/stderr.
    pub fn terminal() -> Self {
        Self { sink: Sink::Terminal }
    }

    /// Console capturing lines in memory, for tests.
    pub fn capture() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (Self { sink: Sink::Capture(lines.clone()) }, lines)
    }

    pub fn info(&self, message: &str) {
        match &self.sink {
            Sink::Terminal => println!("{message}"),
            Sink::Capture(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(message.to_string());
                }
            }
        }
    }

    pub fn warn(&self, message: &str) {
        match &self.sink {
            Sink::Terminal => eprintln!("⚠ {message}"),
            Sink::Capture(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(format!("⚠ {message}"));
                }
            }
        }
    }
}
