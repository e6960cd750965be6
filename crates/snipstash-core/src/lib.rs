//! Snipstash Core - Domain model and execution seams
//!
//! This crate provides the foundational data structures and pure logic for
//! Snipstash, including:
//! - Snippet model with scope-derived type and tag normalization
//! - Static code validator (syntax-only, no side effects)
//! - `CodeRunner` seam for imperative snippet execution
//! - Request context and policy hook traits for host integration
//! - Canonical error taxonomy with stable error codes

pub mod context;
pub mod errors;
pub mod hooks;
pub mod logging_facility;
pub mod model;
pub mod runner;
pub mod validator;

// Re-export commonly used types
pub use context::{EditingSnippet, RequestContext, StaticContext};
pub use errors::{CodeError, Result, SnipError};
pub use hooks::{ExecutionHooks, NoopHooks};
pub use model::{Scope, Snippet, SnippetType};
pub use runner::{CodeRunner, ExecutionFailure, NoopRunner, RunOutcome, RunRequest};
