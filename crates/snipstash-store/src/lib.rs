//! Snipstash Store - SQLite persistence and caching
//!
//! Provides:
//! - Schema management for the site and shared snippet tables
//! - Snippet repository (CRUD plus the hot-path active-by-scope query)
//! - Read-through cache layer with eager group invalidation
//! - Site/tenant option blobs (shared-activation and recently-activated
//!   records) with merge semantics safe under concurrent writers

pub mod cache;
pub mod db;
pub mod errors;
pub mod options;
pub mod schema;
pub mod snippets;
pub mod tables;

// Re-export key types
pub use cache::{CacheBackend, MemoryCache};
pub use errors::Result;
pub use snippets::ActiveRow;
pub use tables::{TableCheckCache, Tables};
