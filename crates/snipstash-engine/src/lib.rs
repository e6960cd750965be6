//! Snipstash Engine - Orchestration layer
//!
//! Coordinates the activation/lifecycle state machine, the execution
//! engine, rendering, and import/export on top of the store and cache
//! layers.

pub mod commands;
pub mod env;

pub use env::SnippetEnv;
