//! Schema management for snippet and option tables

use rusqlite::Connection;

use crate::errors::{from_rusqlite, Result};
use crate::tables::{TableCheckCache, Tables};

/// Create a single snippet table if it does not already exist.
///
/// Returns whether the DDL succeeded. A zero `modified` value is the
/// epoch sentinel for "never saved".
pub fn create_table(conn: &Connection, table: &str) -> Result<bool> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT    NOT NULL DEFAULT '',
            description TEXT    NOT NULL DEFAULT '',
            code        TEXT    NOT NULL DEFAULT '',
            tags        TEXT    NOT NULL DEFAULT '',
            scope       TEXT    NOT NULL DEFAULT 'global',
            priority    INTEGER NOT NULL DEFAULT 10,
            active      INTEGER NOT NULL DEFAULT 0,
            modified    INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_scope ON {table} (scope);
        CREATE INDEX IF NOT EXISTS idx_{table}_active ON {table} (active);"
    );

    match conn.execute_batch(&sql) {
        Ok(()) => Ok(true),
        Err(err) => {
            tracing::warn!(table, error = %err, "snippet table creation failed");
            Ok(false)
        }
    }
}

/// Create the option tables backing the shared-activation and
/// recently-activated records.
pub fn create_option_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS site_options (
            site_id INTEGER NOT NULL,
            name    TEXT    NOT NULL,
            value   TEXT    NOT NULL,
            PRIMARY KEY (site_id, name)
        );
        CREATE TABLE IF NOT EXISTS network_options (
            name  TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .map_err(|e| from_rusqlite("create_option_tables", e))
}

/// Create any snippet tables that are missing for this site.
///
/// The shared table is only created when multisite mode is enabled.
pub fn create_missing_tables(
    conn: &Connection,
    tables: &Tables,
    multisite: bool,
    check: &TableCheckCache,
) -> Result<()> {
    if multisite && !check.exists(conn, &tables.shared, false)? {
        create_table(conn, &tables.shared)?;
        check.reset();
    }

    if !check.exists(conn, &tables.site, false)? {
        create_table(conn, &tables.site)?;
        check.reset();
    }

    create_option_tables(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_create_table_is_idempotent() {
        let conn = db::open_in_memory().unwrap();

        assert!(create_table(&conn, "site1_snippets").unwrap());
        assert!(create_table(&conn, "site1_snippets").unwrap());

        // Defaults applied on bare insert
        conn.execute("INSERT INTO site1_snippets (name) VALUES ('x')", [])
            .unwrap();
        let (scope, priority, active, modified): (String, i32, i64, i64) = conn
            .query_row(
                "SELECT scope, priority, active, modified FROM site1_snippets",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();
        assert_eq!(scope, "global");
        assert_eq!(priority, 10);
        assert_eq!(active, 0);
        assert_eq!(modified, 0);
    }

    #[test]
    fn test_create_missing_tables_respects_multisite() {
        let conn = db::open_in_memory().unwrap();
        let tables = Tables::for_site(1);
        let check = TableCheckCache::new();

        create_missing_tables(&conn, &tables, false, &check).unwrap();
        assert!(check.exists(&conn, &tables.site, true).unwrap());
        assert!(!check.exists(&conn, &tables.shared, true).unwrap());

        create_missing_tables(&conn, &tables, true, &check).unwrap();
        assert!(check.exists(&conn, &tables.shared, true).unwrap());
    }
}
