//! Policy hooks
//!
//! Pure extension points the host may implement to observe or veto
//! snippet execution. The engine functions fully with the no-op
//! implementation.

use crate::model::Scope;
use crate::runner::{ExecutionFailure, RunOutcome};

/// Pluggable execution policy.
pub trait ExecutionHooks {
    /// Veto point checked before each snippet executes.
    ///
    /// # Arguments
    /// * `id` - Snippet ID about to execute
    /// * `network` - Whether the snippet came from the shared table
    ///
    /// # Returns
    /// `false` to skip the snippet; the engine continues with the rest.
    fn allow_execute(&self, _id: i64, _network: bool) -> bool {
        true
    }

    /// Observation point invoked after each snippet executes
    fn after_execute(&self, _id: i64, _network: bool, _result: &Result<RunOutcome, ExecutionFailure>) {}

    /// Override the default scope set for a request.
    ///
    /// Returning None keeps the engine's default selection.
    fn default_scopes(&self, _is_admin: bool) -> Option<Vec<Scope>> {
        None
    }
}

/// Hooks implementation that allows everything and observes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ExecutionHooks for NoopHooks {}
