//! Snippet lifecycle operations
//!
//! Create/read/update/delete plus the activation state machine. Every
//! write invalidates the cache for the affected table before returning,
//! so a read immediately following a write always observes the new
//! state.

use std::collections::BTreeMap;

use chrono::Utc;
use snipstash_core::errors::{Result, SnipError};
use snipstash_core::model::{Scope, Snippet, SnippetType};
use snipstash_core::validator;
use snipstash_store::errors::storage_error;
use snipstash_store::options::{
    self, OptionScope, ACTIVE_SHARED_NETWORK_SNIPPETS, RECENTLY_ACTIVATED_SNIPPETS,
    SHARED_NETWORK_SNIPPETS,
};
use snipstash_store::{cache, snippets};

use crate::env::SnippetEnv;

/// How long a deactivation stays in the recently-activated record
pub const DEFAULT_RECENTLY_ACTIVE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

fn not_found(id: i64, table: &str) -> SnipError {
    SnipError::NotFound {
        id,
        table: table.to_string(),
    }
}

fn option_scope(env: &SnippetEnv<'_>, network: bool) -> OptionScope {
    if network {
        OptionScope::Network
    } else {
        OptionScope::Site(env.site)
    }
}

/// Resolve the shared-network flag against the tenant shared-ID list.
///
/// Only meaningful for saved shared-table snippets; everything else is
/// plainly not shared.
fn resolve_shared_network(env: &SnippetEnv<'_>, snippet: &mut Snippet) -> Result<()> {
    snippet.shared_network = if env.multisite && snippet.network && snippet.is_saved() {
        let shared: Vec<i64> =
            options::get_option(env.conn, OptionScope::Network, SHARED_NETWORK_SNIPPETS)?
                .unwrap_or_default();
        shared.contains(&snippet.id)
    } else {
        false
    };
    Ok(())
}

/// Retrieve a single snippet.
///
/// Returns an empty, unsaved snippet (id 0) when the ID does not exist;
/// "not found" is never an error on the read path.
pub fn get_snippet(env: &SnippetEnv<'_>, id: i64, network: bool) -> Result<Snippet> {
    let network = env.resolve_network(network);
    let table = env.tables.name(network);

    if id <= 0 {
        let mut snippet = Snippet::new();
        snippet.network = network;
        return Ok(snippet);
    }

    // Serve from the cached full list when one exists
    if let Some(blob) = env.cache.get(&cache::all_snippets_key(table)) {
        if let Ok(cached) = serde_json::from_str::<Vec<Snippet>>(&blob) {
            if let Some(snippet) = cached.into_iter().find(|s| s.id == id) {
                return Ok(snippet);
            }
        }
    }

    let mut snippet = snippets::fetch_snippet(env.conn, table, id, network)?.unwrap_or_else(|| {
        let mut empty = Snippet::new();
        empty.network = network;
        empty
    });
    resolve_shared_network(env, &mut snippet)?;
    Ok(snippet)
}

/// Retrieve all snippets from a table, or a subset by ID.
///
/// A single-ID request is a fast path equivalent to [`get_snippet`].
/// The unfiltered list is cached under the table's all-rows key.
pub fn get_snippets(env: &SnippetEnv<'_>, ids: &[i64], network: bool) -> Result<Vec<Snippet>> {
    if ids.len() == 1 {
        return Ok(vec![get_snippet(env, ids[0], network)?]);
    }

    let network = env.resolve_network(network);
    let table = env.tables.name(network);
    let key = cache::all_snippets_key(table);

    let all: Vec<Snippet> = match env.cache.get(&key) {
        Some(blob) => serde_json::from_str(&blob).map_err(|e| SnipError::Serialization {
            op: "all_snippets_decode".to_string(),
            message: e.to_string(),
        })?,
        None => {
            let mut all = snippets::fetch_all_snippets(env.conn, table, network)?;
            for snippet in &mut all {
                resolve_shared_network(env, snippet)?;
            }
            if ids.is_empty() {
                let blob =
                    serde_json::to_string(&all).map_err(|e| SnipError::Serialization {
                        op: "all_snippets_encode".to_string(),
                        message: e.to_string(),
                    })?;
                env.cache.set(&key, blob);
            }
            all
        }
    };

    if ids.is_empty() {
        Ok(all)
    } else {
        Ok(all.into_iter().filter(|s| ids.contains(&s.id)).collect())
    }
}

/// All tags in use in a table, cached under the all-tags key.
pub fn get_all_snippet_tags(env: &SnippetEnv<'_>, network: bool) -> Result<Vec<String>> {
    let table = env.table_name(network);
    let key = cache::all_tags_key(table);

    if let Some(blob) = env.cache.get(&key) {
        if let Ok(tags) = serde_json::from_str::<Vec<String>>(&blob) {
            return Ok(tags);
        }
    }

    let tags = snippets::fetch_all_tags(env.conn, table)?;
    if let Ok(blob) = serde_json::to_string(&tags) {
        env.cache.set(&key, blob);
    }
    Ok(tags)
}

/// Test snippet code for errors, augmenting the snippet object.
///
/// Only the `php` type family is validated; other types carry no
/// executable syntax to check.
pub fn test_snippet_code(snippet: &mut Snippet) {
    snippet.code_error = None;

    if snippet.snippet_type() != SnippetType::Php {
        return;
    }

    snippet.code_error = validator::validate(&snippet.code);
}

/// Activate a snippet.
///
/// Code must pass validation before the active flag is written; invalid
/// code leaves the snippet inactive and surfaces the specific error.
pub fn activate_snippet(env: &SnippetEnv<'_>, id: i64, network: bool) -> Result<Snippet> {
    let network = env.resolve_network(network);
    let table = env.tables.name(network).to_string();

    let mut snippet = get_snippet(env, id, network)?;
    if !snippet.is_saved() {
        return Err(not_found(id, &table));
    }

    if snippet.snippet_type() == SnippetType::Php {
        if let Some(error) = validator::validate(&snippet.code) {
            return Err(SnipError::Validation(error));
        }
    }

    if !snippets::set_active(env.conn, &table, id, true)? {
        return Err(storage_error(
            "activate_snippet",
            format!("no row written for snippet {}", id),
        ));
    }

    snippet.active = true;
    update_shared_network_snippets(env, std::slice::from_ref(&snippet))?;
    cache::clean_snippets_cache(env.cache, &table);

    tracing::debug!(id, network, "snippet activated");
    Ok(snippet)
}

/// Activate multiple snippets in one storage statement.
///
/// Each candidate is validated individually; snippets failing validation
/// are excluded from the bulk write. Returns the IDs that were
/// activated.
pub fn activate_snippets(env: &SnippetEnv<'_>, ids: &[i64], network: bool) -> Result<Vec<i64>> {
    let network = env.resolve_network(network);
    let table = env.tables.name(network).to_string();

    let candidates = get_snippets(env, ids, network)?;
    let mut valid_ids = Vec::new();
    let mut valid_snippets = Vec::new();

    for mut snippet in candidates {
        if snippet.snippet_type() == SnippetType::Php {
            if let Some(error) = validator::validate(&snippet.code) {
                tracing::debug!(id = snippet.id, %error, "excluding snippet from bulk activation");
                continue;
            }
        }
        snippet.active = true;
        valid_ids.push(snippet.id);
        valid_snippets.push(snippet);
    }

    if valid_ids.is_empty() {
        return Ok(Vec::new());
    }

    snippets::set_active_many(env.conn, &table, &valid_ids, true)?;

    // Propagate the full valid set, not just the last snippet
    update_shared_network_snippets(env, &valid_snippets)?;
    cache::clean_snippets_cache(env.cache, &table);
    Ok(valid_ids)
}

/// Deactivate a snippet and record it in the recently-activated map.
pub fn deactivate_snippet(env: &SnippetEnv<'_>, id: i64, network: bool) -> Result<Snippet> {
    let network = env.resolve_network(network);
    let table = env.tables.name(network).to_string();

    if !snippets::set_active(env.conn, &table, id, false)? {
        return Err(not_found(id, &table));
    }

    let mut snippet = get_snippet(env, id, network)?;
    snippet.active = false;

    record_recently_activated(env, network, id)?;
    update_shared_network_snippets(env, std::slice::from_ref(&snippet))?;
    cache::clean_snippets_cache(env.cache, &table);

    tracing::debug!(id, network, "snippet deactivated");
    Ok(snippet)
}

/// Delete a snippet from the database.
pub fn delete_snippet(env: &SnippetEnv<'_>, id: i64, network: bool) -> Result<()> {
    let network = env.resolve_network(network);
    let table = env.tables.name(network).to_string();

    if !snippets::delete_snippet(env.conn, &table, id)? {
        return Err(not_found(id, &table));
    }

    cache::clean_snippets_cache(env.cache, &table);
    Ok(())
}

/// Strip a leading open tag and trailing close tag from pasted code.
///
/// Defensive normalization for fragments copied out of full source
/// files.
fn trim_php_tags(code: &str) -> String {
    let mut out = code;

    let lead = out.trim_start();
    if let Some(rest) = lead.strip_prefix("<?php") {
        out = rest;
    } else if let Some(rest) = lead.strip_prefix("<?") {
        out = rest;
    }

    let tail = out.trim_end();
    if let Some(rest) = tail.strip_suffix("?>") {
        out = rest;
    }

    out.to_string()
}

/// Save a snippet, creating it when its ID is 0.
///
/// Active php snippets are re-validated as part of the save; a snippet
/// whose code no longer passes is persisted with active=false, so no
/// syntactically invalid snippet remains flagged active after a save
/// completes. Shared-network snippets are always persisted inactive in
/// their own row: their activation state lives in the per-site
/// shared-activation records.
pub fn save_snippet(env: &SnippetEnv<'_>, mut snippet: Snippet) -> Result<Snippet> {
    snippet.network = env.resolve_network(snippet.network);
    let table = env.tables.name(snippet.network).to_string();

    snippet.update_modified();

    if snippet.snippet_type() == SnippetType::Php {
        snippet.code = trim_php_tags(&snippet.code);

        // Defuse the snippet if the new code no longer validates
        if snippet.active && snippet.scope != Scope::SingleUse {
            test_snippet_code(&mut snippet);
            if snippet.code_error.is_some() {
                snippet.active = false;
            }
        }
    }

    // The shared row itself never carries the active flag
    let mut row = snippet.clone();
    row.active = snippet.active && !snippet.shared_network;

    if snippet.id == 0 {
        snippet.id = snippets::insert_snippet(env.conn, &table, &row)?;
    } else if !snippets::update_snippet(env.conn, &table, &row)? {
        return Err(storage_error(
            "save_snippet",
            format!("no row written for snippet {}", snippet.id),
        ));
    }

    update_shared_network_snippets(env, std::slice::from_ref(&snippet))?;
    cache::clean_snippets_cache(env.cache, &table);
    Ok(snippet)
}

/// Copy a snippet into a brand-new inactive snippet.
///
/// Everything but identity and activation state carries over; the name
/// is suffixed so the copy is distinguishable.
pub fn clone_snippet(env: &SnippetEnv<'_>, id: i64, network: bool) -> Result<Snippet> {
    let network = env.resolve_network(network);
    let source = get_snippet(env, id, network)?;
    if !source.is_saved() {
        return Err(not_found(id, env.tables.name(network)));
    }

    let mut copy = source;
    copy.id = 0;
    copy.active = false;
    copy.shared_network = false;
    copy.name = format!("{} [CLONE]", copy.display_name());
    copy.modified = None;

    save_snippet(env, copy)
}

/// Ensure the shared-network bookkeeping reflects recently updated
/// snippets.
///
/// Activation adds IDs to the tenant-wide shared list; deactivation
/// removes them and clears the ID from every site's shared-activation
/// record. One site's cleanup failure is logged and does not abort the
/// rest.
pub fn update_shared_network_snippets(
    env: &SnippetEnv<'_>,
    updated: &[Snippet],
) -> Result<bool> {
    if !env.multisite {
        return Ok(false);
    }

    let mut shared = Vec::new();
    let mut unshared = Vec::new();

    for snippet in updated {
        if snippet.shared_network {
            if snippet.active {
                shared.push(snippet.id);
            } else {
                unshared.push(snippet.id);
            }
        }
    }

    if shared.is_empty() && unshared.is_empty() {
        return Ok(false);
    }

    let mut changed =
        options::add_to_id_set(env.conn, OptionScope::Network, SHARED_NETWORK_SNIPPETS, &shared)?;
    changed |= options::remove_from_id_set(
        env.conn,
        OptionScope::Network,
        SHARED_NETWORK_SNIPPETS,
        &unshared,
    )?;

    if !unshared.is_empty() {
        for site in options::list_site_ids(env.conn)? {
            let result = options::remove_from_id_set(
                env.conn,
                OptionScope::Site(site),
                ACTIVE_SHARED_NETWORK_SNIPPETS,
                &unshared,
            );
            if let Err(error) = result {
                tracing::warn!(site, %error, "shared-activation cleanup failed for site");
            }
        }
        cache::clean_active_snippets_cache(env.cache, &env.tables.shared, None);
    }

    Ok(changed)
}

/// Opt the current site into a shared-table snippet.
pub fn activate_shared_snippet(env: &SnippetEnv<'_>, id: i64) -> Result<bool> {
    if !env.multisite {
        return Ok(false);
    }

    let changed = options::add_to_id_set(
        env.conn,
        OptionScope::Site(env.site),
        ACTIVE_SHARED_NETWORK_SNIPPETS,
        &[id],
    )?;
    if changed {
        cache::clean_active_snippets_cache(env.cache, &env.tables.shared, None);
    }
    Ok(changed)
}

/// Opt the current site out of a shared-table snippet.
pub fn deactivate_shared_snippet(env: &SnippetEnv<'_>, id: i64) -> Result<bool> {
    if !env.multisite {
        return Ok(false);
    }

    let changed = options::remove_from_id_set(
        env.conn,
        OptionScope::Site(env.site),
        ACTIVE_SHARED_NETWORK_SNIPPETS,
        &[id],
    )?;
    if changed {
        record_recently_activated(env, false, id)?;
        cache::clean_active_snippets_cache(env.cache, &env.tables.shared, None);
    }
    Ok(changed)
}

/// Record a deactivation in the recently-activated map.
fn record_recently_activated(env: &SnippetEnv<'_>, network: bool, id: i64) -> Result<()> {
    let scope = option_scope(env, network);
    let mut map: BTreeMap<i64, i64> =
        options::get_option(env.conn, scope, RECENTLY_ACTIVATED_SNIPPETS)?.unwrap_or_default();
    map.insert(id, Utc::now().timestamp());
    options::set_option(env.conn, scope, RECENTLY_ACTIVATED_SNIPPETS, &map)
}

/// Read the recently-activated map, lazily pruning aged entries.
///
/// The TTL is a policy default, not an invariant; pass whatever horizon
/// the caller's view wants.
pub fn recently_activated(
    env: &SnippetEnv<'_>,
    network: bool,
    ttl_secs: i64,
) -> Result<BTreeMap<i64, i64>> {
    let scope = option_scope(env, env.resolve_network(network));
    let mut map: BTreeMap<i64, i64> =
        options::get_option(env.conn, scope, RECENTLY_ACTIVATED_SNIPPETS)?.unwrap_or_default();

    let cutoff = Utc::now().timestamp() - ttl_secs;
    let before = map.len();
    map.retain(|_, &mut at| at >= cutoff);

    if map.len() != before {
        options::set_option(env.conn, scope, RECENTLY_ACTIVATED_SNIPPETS, &map)?;
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_php_tags() {
        assert_eq!(trim_php_tags("  <?php echo 1; ?>  "), " echo 1; ");
        assert_eq!(trim_php_tags("<? echo 1;"), " echo 1;");
        assert_eq!(trim_php_tags("echo 1;"), "echo 1;");
        assert_eq!(trim_php_tags(""), "");
    }
}
