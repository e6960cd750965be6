//! Engine commands

pub mod execute;
pub mod export;
pub mod render;
pub mod snippet_ops;
