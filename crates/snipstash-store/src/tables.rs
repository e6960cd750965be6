//! Snippet table identity
//!
//! Two physical tables exist: a per-site table and one shared table for
//! the whole tenant. Table names are derived from the site ID, never from
//! user input.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::Connection;
use snipstash_core::context::SiteId;

use crate::errors::{from_rusqlite, Result};

/// Name of the tenant-shared snippet table
pub const SHARED_TABLE: &str = "ms_snippets";

/// Resolved table names for one site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    /// Site-local snippet table
    pub site: String,
    /// Tenant-shared snippet table
    pub shared: String,
}

impl Tables {
    /// Resolve table names for the given site
    pub fn for_site(site: SiteId) -> Self {
        Self {
            site: site_table_name(site),
            shared: SHARED_TABLE.to_string(),
        }
    }

    /// Select the shared (true) or site (false) table name
    pub fn name(&self, network: bool) -> &str {
        if network {
            &self.shared
        } else {
            &self.site
        }
    }
}

/// Name of a site's local snippet table
pub fn site_table_name(site: SiteId) -> String {
    format!("site{}_snippets", site)
}

/// Process-scoped memo of table-existence checks.
///
/// Explicit state object rather than a function-local static, so tests
/// can reset it between cases.
#[derive(Debug, Default)]
pub struct TableCheckCache {
    checked: Mutex<HashMap<String, bool>>,
}

impl TableCheckCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Determine whether a table exists, memoizing the answer.
    ///
    /// Pass `refresh` to rerun the query instead of using a cached value.
    pub fn exists(&self, conn: &Connection, table: &str, refresh: bool) -> Result<bool> {
        if !refresh {
            if let Some(&known) = self.checked.lock().unwrap().get(table) {
                return Ok(known);
            }
        }

        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )
            .map_err(|e| from_rusqlite("table_exists", e))?;

        let exists = found > 0;
        self.checked
            .lock()
            .unwrap()
            .insert(table.to_string(), exists);
        Ok(exists)
    }

    /// Forget all memoized answers
    pub fn reset(&self) {
        self.checked.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_table_names() {
        let tables = Tables::for_site(1);
        assert_eq!(tables.site, "site1_snippets");
        assert_eq!(tables.shared, "ms_snippets");
        assert_eq!(tables.name(true), "ms_snippets");
        assert_eq!(tables.name(false), "site1_snippets");
    }

    #[test]
    fn test_check_cache_memoizes_until_reset() {
        let conn = db::open_in_memory().unwrap();
        let check = TableCheckCache::new();

        assert!(!check.exists(&conn, "later", false).unwrap());

        conn.execute("CREATE TABLE later (id INTEGER)", []).unwrap();

        // Memoized answer is stale until refreshed or reset
        assert!(!check.exists(&conn, "later", false).unwrap());
        assert!(check.exists(&conn, "later", true).unwrap());

        check.reset();
        assert!(check.exists(&conn, "later", false).unwrap());
    }
}
