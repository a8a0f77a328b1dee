//! Write-only channel for human-readable status lines
//!
//! Sessions write cache notices, request status and the formatted report
//! here. The CLI writes to stderr; tests capture lines with a `Recorder`.

use std::sync::{Arc, Mutex};

/// A sink for status, warning and report lines
pub trait Diagnostics: Send {
    fn emit(&mut self, line: &str);
}

/// Writes each line to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct Stderr;

impl Diagnostics for Stderr {
    fn emit(&mut self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Keeps every emitted line in memory
///
/// Clones share the same buffer, so a test can hand one clone to a session
/// and read the lines back through another.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl Diagnostics for Recorder {
    fn emit(&mut self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
