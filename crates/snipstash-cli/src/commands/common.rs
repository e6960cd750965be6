//! Shared command plumbing
//!
//! Every command opens the same environment: a SQLite database on disk,
//! a fresh in-process cache, and the table set for the selected site.

use clap::Args;
use rusqlite::Connection;
use snipstash_store::cache::MemoryCache;
use snipstash_store::db;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DbArgs {
    /// Path to the snippet database
    #[arg(long, global = true, default_value = "snipstash.db")]
    pub db: PathBuf,

    /// Site to operate on
    #[arg(long, global = true, default_value_t = 1)]
    pub site: i64,

    /// Enable the tenant-shared snippet table
    #[arg(long, global = true)]
    pub multisite: bool,
}

/// Open the database and a fresh cache for one command invocation.
///
/// The cache is per-invocation: a CLI process serves exactly one
/// "request", so there is nothing to keep warm across commands.
pub fn open(args: &DbArgs) -> Result<(Connection, MemoryCache), Box<dyn std::error::Error>> {
    let conn = db::open(&args.db)?;
    Ok((conn, MemoryCache::new()))
}
