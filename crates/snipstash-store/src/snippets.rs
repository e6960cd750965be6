//! Snippet repository
//!
//! Stateless functions over a `&Connection`. Full `Snippet` objects are
//! hydrated for management reads; the hot path used once per request
//! (`fetch_active_by_scope`) returns slim [`ActiveRow`] values instead.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use snipstash_core::model::{build_tags_vec, Scope, Snippet};

use crate::errors::{from_rusqlite, Result};

/// Slim row returned by the hot-path active-snippet query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRow {
    pub id: i64,
    pub code: String,
    pub scope: Scope,
    pub active: bool,
}

fn timestamp_to_modified(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        None
    } else {
        Utc.timestamp_opt(secs, 0).single()
    }
}

fn modified_to_timestamp(modified: Option<DateTime<Utc>>) -> i64 {
    modified.map(|m| m.timestamp()).unwrap_or(0)
}

fn row_to_snippet(row: &Row<'_>, network: bool) -> rusqlite::Result<Snippet> {
    let tags: String = row.get(4)?;
    let scope: String = row.get(5)?;
    let modified: i64 = row.get(8)?;

    Ok(Snippet {
        id: row.get(0)?,
        name: row.get(1)?,
        desc: row.get(2)?,
        code: row.get(3)?,
        tags: build_tags_vec(&tags),
        scope: Scope::parse(&scope).unwrap_or_default(),
        priority: row.get(6)?,
        active: row.get::<_, i64>(7)? != 0,
        network,
        shared_network: false,
        modified: timestamp_to_modified(modified),
        code_error: None,
    })
}

const SNIPPET_COLUMNS: &str = "id, name, description, code, tags, scope, priority, active, modified";

/// Fetch a single snippet by primary key.
///
/// The `network` flag is stamped onto the result; it is not stored in
/// the row itself.
pub fn fetch_snippet(
    conn: &Connection,
    table: &str,
    id: i64,
    network: bool,
) -> Result<Option<Snippet>> {
    conn.query_row(
        &format!("SELECT {SNIPPET_COLUMNS} FROM {table} WHERE id = ?1"),
        [id],
        |row| row_to_snippet(row, network),
    )
    .optional()
    .map_err(|e| from_rusqlite("fetch_snippet", e))
}

/// Fetch every snippet in a table, ordered by ID
pub fn fetch_all_snippets(conn: &Connection, table: &str, network: bool) -> Result<Vec<Snippet>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SNIPPET_COLUMNS} FROM {table} ORDER BY id"
        ))
        .map_err(|e| from_rusqlite("fetch_all_snippets", e))?;

    let rows = stmt
        .query_map([], |row| row_to_snippet(row, network))
        .map_err(|e| from_rusqlite("fetch_all_snippets", e))?;

    let mut snippets = Vec::new();
    for row in rows {
        snippets.push(row.map_err(|e| from_rusqlite("fetch_all_snippets", e))?);
    }
    Ok(snippets)
}

/// Insert a new snippet, returning the assigned ID
pub fn insert_snippet(conn: &Connection, table: &str, snippet: &Snippet) -> Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO {table} (name, description, code, tags, scope, priority, active, modified)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
        ),
        params![
            snippet.name,
            snippet.desc,
            snippet.code,
            snippet.tags_list(),
            snippet.scope.as_str(),
            snippet.priority,
            snippet.active as i64,
            modified_to_timestamp(snippet.modified),
        ],
    )
    .map_err(|e| from_rusqlite("insert_snippet", e))?;

    Ok(conn.last_insert_rowid())
}

/// Update an existing snippet by ID. Returns whether a row was written.
pub fn update_snippet(conn: &Connection, table: &str, snippet: &Snippet) -> Result<bool> {
    let rows = conn
        .execute(
            &format!(
                "UPDATE {table}
                 SET name = ?1, description = ?2, code = ?3, tags = ?4,
                     scope = ?5, priority = ?6, active = ?7, modified = ?8
                 WHERE id = ?9"
            ),
            params![
                snippet.name,
                snippet.desc,
                snippet.code,
                snippet.tags_list(),
                snippet.scope.as_str(),
                snippet.priority,
                snippet.active as i64,
                modified_to_timestamp(snippet.modified),
                snippet.id,
            ],
        )
        .map_err(|e| from_rusqlite("update_snippet", e))?;

    Ok(rows > 0)
}

/// Delete a snippet by ID. Returns whether a row was removed.
pub fn delete_snippet(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let rows = conn
        .execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])
        .map_err(|e| from_rusqlite("delete_snippet", e))?;
    Ok(rows > 0)
}

/// Set the active flag on one snippet. Returns whether a row was written.
pub fn set_active(conn: &Connection, table: &str, id: i64, active: bool) -> Result<bool> {
    let rows = conn
        .execute(
            &format!("UPDATE {table} SET active = ?1 WHERE id = ?2"),
            params![active as i64, id],
        )
        .map_err(|e| from_rusqlite("set_active", e))?;
    Ok(rows > 0)
}

/// Conditionally deactivate a snippet that is currently active.
///
/// Single atomic statement checking the affected-row count: when two
/// requests race to consume the same single-use snippet, exactly one
/// observes `true` here.
pub fn deactivate_if_active(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let rows = conn
        .execute(
            &format!("UPDATE {table} SET active = 0 WHERE id = ?1 AND active = 1"),
            [id],
        )
        .map_err(|e| from_rusqlite("deactivate_if_active", e))?;
    Ok(rows == 1)
}

/// Set the active flag on a set of snippets in one statement.
///
/// Returns the number of rows written.
pub fn set_active_many(conn: &Connection, table: &str, ids: &[i64], active: bool) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; ids.len()].join(",");
    let sql = format!(
        "UPDATE {table} SET active = {} WHERE id IN ({placeholders})",
        active as i64
    );

    let rows = conn
        .execute(&sql, rusqlite::params_from_iter(ids.iter()))
        .map_err(|e| from_rusqlite("set_active_many", e))?;
    Ok(rows)
}

/// Fetch the slim rows for snippets matching a scope set.
///
/// Ordered by (priority ascending, id ascending). Request-serving code
/// must go through the cache layer rather than calling this directly.
pub fn fetch_active_by_scope(
    conn: &Connection,
    table: &str,
    scopes: &[Scope],
    active_only: bool,
) -> Result<Vec<ActiveRow>> {
    if scopes.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; scopes.len()].join(",");
    let extra_where = if active_only { "AND active = 1" } else { "" };
    let sql = format!(
        "SELECT id, code, scope, active
         FROM {table}
         WHERE scope IN ({placeholders}) {extra_where}
         ORDER BY priority, id"
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| from_rusqlite("fetch_active_by_scope", e))?;

    let rows = stmt
        .query_map(
            rusqlite::params_from_iter(scopes.iter().map(Scope::as_str)),
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .map_err(|e| from_rusqlite("fetch_active_by_scope", e))?;

    let mut out = Vec::new();
    for row in rows {
        let (id, code, scope, active) = row.map_err(|e| from_rusqlite("fetch_active_by_scope", e))?;
        match Scope::parse(&scope) {
            Some(scope) => out.push(ActiveRow {
                id,
                code,
                scope,
                active: active != 0,
            }),
            None => {
                tracing::warn!(id, scope, "skipping snippet row with unknown scope");
            }
        }
    }
    Ok(out)
}

/// Collect the distinct union of all tags used in a table.
pub fn fetch_all_tags(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("SELECT tags FROM {table}"))
        .map_err(|e| from_rusqlite("fetch_all_tags", e))?;

    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| from_rusqlite("fetch_all_tags", e))?;

    let mut tags: Vec<String> = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| from_rusqlite("fetch_all_tags", e))?;
        for tag in build_tags_vec(&raw) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    Ok(tags)
}
