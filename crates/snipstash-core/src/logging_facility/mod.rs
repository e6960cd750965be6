//! Logging facility
//!
//! Single initialization point for the tracing subscriber.

mod init;

pub use init::{init, Profile};
