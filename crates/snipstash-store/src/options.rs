//! Site and tenant option blobs
//!
//! Small JSON-encoded records that live outside the snippet tables: the
//! tenant-wide shared snippet list, each site's shared-activation record,
//! and the recently-activated audit map. ID-set mutations use
//! read-modify-write inside an immediate transaction with union/
//! set-difference semantics, so concurrent writers cannot silently drop
//! each other's additions.

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snipstash_core::context::SiteId;

use crate::errors::{from_rusqlite, from_serde, Result};

/// Tenant option: IDs of shared-table snippets marked as shared
pub const SHARED_NETWORK_SNIPPETS: &str = "shared_network_snippets";

/// Site option: shared-table snippet IDs this site has opted into
pub const ACTIVE_SHARED_NETWORK_SNIPPETS: &str = "active_shared_network_snippets";

/// Option: map of snippet ID to deactivation timestamp
pub const RECENTLY_ACTIVATED_SNIPPETS: &str = "recently_activated_snippets";

/// Which option table a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    /// Per-site record
    Site(SiteId),
    /// Tenant-wide record
    Network,
}

/// Read an option, deserializing its JSON blob
pub fn get_option<T: DeserializeOwned>(
    conn: &Connection,
    scope: OptionScope,
    name: &str,
) -> Result<Option<T>> {
    let blob: Option<String> = match scope {
        OptionScope::Site(site) => conn
            .query_row(
                "SELECT value FROM site_options WHERE site_id = ?1 AND name = ?2",
                params![site, name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| from_rusqlite("get_option", e))?,
        OptionScope::Network => conn
            .query_row(
                "SELECT value FROM network_options WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| from_rusqlite("get_option", e))?,
    };

    match blob {
        Some(blob) => Ok(Some(
            serde_json::from_str(&blob).map_err(|e| from_serde("get_option", e))?,
        )),
        None => Ok(None),
    }
}

/// Write an option, serializing the value as JSON
pub fn set_option<T: Serialize>(
    conn: &Connection,
    scope: OptionScope,
    name: &str,
    value: &T,
) -> Result<()> {
    let blob = serde_json::to_string(value).map_err(|e| from_serde("set_option", e))?;

    match scope {
        OptionScope::Site(site) => conn
            .execute(
                "INSERT INTO site_options (site_id, name, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT(site_id, name) DO UPDATE SET value = excluded.value",
                params![site, name, blob],
            )
            .map_err(|e| from_rusqlite("set_option", e))?,
        OptionScope::Network => conn
            .execute(
                "INSERT INTO network_options (name, value) VALUES (?1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value",
                params![name, blob],
            )
            .map_err(|e| from_rusqlite("set_option", e))?,
    };

    Ok(())
}

fn with_immediate_tx<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| from_rusqlite("begin_immediate", e))?;

    match f(conn) {
        Ok(value) => {
            conn.execute_batch("COMMIT")
                .map_err(|e| from_rusqlite("commit", e))?;
            Ok(value)
        }
        Err(err) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(err)
        }
    }
}

/// Merge IDs into an option's ID set (union semantics).
///
/// Returns whether the stored set changed.
pub fn add_to_id_set(
    conn: &Connection,
    scope: OptionScope,
    name: &str,
    ids: &[i64],
) -> Result<bool> {
    if ids.is_empty() {
        return Ok(false);
    }

    with_immediate_tx(conn, |conn| {
        let mut set: Vec<i64> = get_option(conn, scope, name)?.unwrap_or_default();
        let mut changed = false;

        for &id in ids {
            if !set.contains(&id) {
                set.push(id);
                changed = true;
            }
        }

        if changed {
            set_option(conn, scope, name, &set)?;
        }
        Ok(changed)
    })
}

/// Remove IDs from an option's ID set (set-difference semantics).
///
/// Returns whether the stored set changed.
pub fn remove_from_id_set(
    conn: &Connection,
    scope: OptionScope,
    name: &str,
    ids: &[i64],
) -> Result<bool> {
    if ids.is_empty() {
        return Ok(false);
    }

    with_immediate_tx(conn, |conn| {
        let mut set: Vec<i64> = get_option(conn, scope, name)?.unwrap_or_default();
        let before = set.len();
        set.retain(|id| !ids.contains(id));
        let changed = set.len() != before;

        if changed {
            set_option(conn, scope, name, &set)?;
        }
        Ok(changed)
    })
}

/// Enumerate every site that holds at least one option record.
///
/// This bounds the cross-site cleanup performed when a shared snippet is
/// unshared: a site without options has no shared-activation record to
/// clean.
pub fn list_site_ids(conn: &Connection) -> Result<Vec<SiteId>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT site_id FROM site_options ORDER BY site_id")
        .map_err(|e| from_rusqlite("list_site_ids", e))?;

    let rows = stmt
        .query_map([], |row| row.get::<_, i64>(0))
        .map_err(|e| from_rusqlite("list_site_ids", e))?;

    let mut sites = Vec::new();
    for row in rows {
        sites.push(row.map_err(|e| from_rusqlite("list_site_ids", e))?);
    }
    Ok(sites)
}
