//! Code runner seam
//!
//! The engine never evaluates stored text itself. Imperative execution is
//! delegated to a [`CodeRunner`] implementation supplied by the host,
//! keeping the dangerous capability behind a narrow, mockable interface.
//! Markup, style, and script snippets bypass the runner entirely: they
//! are passthrough-rendered by the engine.

use crate::model::Scope;

/// A single execution request handed to a runner.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    /// Snippet ID, for reporting. 0 for ad-hoc code.
    pub id: i64,
    /// The raw source to execute
    pub code: &'a str,
    /// Scope the snippet was selected under
    pub scope: Scope,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Code was executed; any incidental output was captured and discarded
    Executed,
    /// Runner declined to execute (e.g. no interpreter available)
    Skipped,
}

/// Runtime failure surfaced by a runner.
///
/// The engine catches these at single-snippet granularity: a failing
/// snippet never interrupts the remaining candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    /// Description of the failure
    pub message: String,
    /// 1-based source line, when the failure is syntax-level
    pub line: Option<u32>,
}

impl std::fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} on line {}", self.message, line),
            None => f.write_str(&self.message),
        }
    }
}

/// Capability to execute a snippet's source as imperative code.
///
/// Implementations must capture and discard any output the code produces,
/// and must report syntax-level failures as [`ExecutionFailure`] rather
/// than panicking or aborting the host request.
pub trait CodeRunner {
    /// Execute one snippet
    fn run(&self, request: &RunRequest<'_>) -> Result<RunOutcome, ExecutionFailure>;
}

/// Runner that executes nothing.
///
/// Used by hosts without an interpreter and as the safe default: every
/// run reports [`RunOutcome::Skipped`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunner;

impl CodeRunner for NoopRunner {
    fn run(&self, _request: &RunRequest<'_>) -> Result<RunOutcome, ExecutionFailure> {
        Ok(RunOutcome::Skipped)
    }
}

/// Test runner that records every execution and can simulate failures.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    executed: std::cell::RefCell<Vec<i64>>,
    /// IDs whose execution should fail
    pub fail_ids: Vec<i64>,
}

impl RecordingRunner {
    /// Create a runner that succeeds for every snippet
    pub fn new() -> Self {
        Self::default()
    }

    /// IDs that have been executed, in order
    pub fn executed(&self) -> Vec<i64> {
        self.executed.borrow().clone()
    }
}

impl CodeRunner for RecordingRunner {
    fn run(&self, request: &RunRequest<'_>) -> Result<RunOutcome, ExecutionFailure> {
        if self.fail_ids.contains(&request.id) {
            return Err(ExecutionFailure {
                message: "simulated runtime failure".to_string(),
                line: None,
            });
        }
        self.executed.borrow_mut().push(request.id);
        Ok(RunOutcome::Executed)
    }
}
