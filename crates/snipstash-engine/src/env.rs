//! Engine environment
//!
//! Bundles the collaborators every command needs: the database
//! connection, the cache backend, the resolved table names, and the
//! multisite flag. Commands receive this by reference; nothing here is
//! global state.

use rusqlite::Connection;
use snipstash_core::context::SiteId;
use snipstash_store::cache::CacheBackend;
use snipstash_store::errors::Result;
use snipstash_store::tables::{TableCheckCache, Tables};
use snipstash_store::schema;

/// Shared collaborators for engine commands.
pub struct SnippetEnv<'a> {
    /// Database connection (both tables live in one database)
    pub conn: &'a Connection,
    /// Cache backend used by the read-through layer
    pub cache: &'a dyn CacheBackend,
    /// Resolved table names for the active site
    pub tables: Tables,
    /// Whether the tenant-shared table is in play
    pub multisite: bool,
    /// The active site identity
    pub site: SiteId,
}

impl<'a> SnippetEnv<'a> {
    /// Create an environment for one site
    pub fn new(
        conn: &'a Connection,
        cache: &'a dyn CacheBackend,
        site: SiteId,
        multisite: bool,
    ) -> Self {
        Self {
            conn,
            cache,
            tables: Tables::for_site(site),
            multisite,
            site,
        }
    }

    /// Ensure the backing tables exist for this environment
    pub fn bootstrap(&self, check: &TableCheckCache) -> Result<()> {
        schema::create_missing_tables(self.conn, &self.tables, self.multisite, check)
    }

    /// Sanitize a network selector: when multisite is disabled, the
    /// shared table is never consulted.
    pub fn resolve_network(&self, network: bool) -> bool {
        self.multisite && network
    }

    /// Table name for the given (sanitized) network selector
    pub fn table_name(&self, network: bool) -> &str {
        self.tables.name(self.resolve_network(network))
    }
}
