//! CLI commands

pub mod common;
pub mod render;
pub mod run;
pub mod snippet;
pub mod transfer;
