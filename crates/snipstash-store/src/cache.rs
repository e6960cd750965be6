//! Read-through cache layer
//!
//! Keyed by the exact (sorted) scope set plus table identity. Results are
//! not composable across keys, so each requested combination caches its
//! own full result set. Invalidation is delete-only: the backend needs no
//! key-enumeration capability because writers eagerly clear the fixed set
//! of precomputed scope groups.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::Connection;
use snipstash_core::model::Scope;

use crate::errors::{from_serde, Result};
use crate::snippets::{self, ActiveRow};

/// Key→blob cache backend with delete-by-exact-key semantics.
pub trait CacheBackend {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn delete(&self, key: &str);
}

/// Default in-process cache backend.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry (for tests)
    pub fn reset(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// Number of cached entries (for tests)
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// The scope groups requested by the execution and render paths.
///
/// Any table write eagerly invalidates every group, trading a fixed
/// small number of deletes for prefix-scan independence. The list must
/// cover each scope combination a request-serving read uses.
pub fn invalidation_groups() -> [Vec<Scope>; 7] {
    [
        vec![Scope::HeadContent, Scope::FooterContent],
        vec![Scope::Global, Scope::SingleUse, Scope::FrontEnd],
        vec![Scope::Global, Scope::SingleUse, Scope::Admin],
        vec![Scope::AdminCss],
        vec![Scope::SiteCss],
        vec![Scope::SiteHeadJs],
        vec![Scope::SiteFooterJs],
    ]
}

/// Cache key for an active-snippet result set.
///
/// The scope list is sorted and deduplicated so the same set always maps
/// to the same key, whichever order the caller assembled it in.
pub fn active_snippets_key(scopes: &[Scope], table: &str) -> String {
    let mut names: Vec<&str> = scopes.iter().map(Scope::as_str).collect();
    names.sort_unstable();
    names.dedup();
    format!("active_snippets_{}_{}", names.join("_"), table)
}

/// Cache key for a table's full snippet list
pub fn all_snippets_key(table: &str) -> String {
    format!("all_snippets_{}", table)
}

/// Cache key for a table's tag union
pub fn all_tags_key(table: &str) -> String {
    format!("all_tags_{}", table)
}

/// Read-through fetch of active-snippet rows for a scope set.
///
/// On miss, delegates to the store and caches the full result under the
/// exact requested scope set.
pub fn get_active_snippets(
    conn: &Connection,
    cache: &dyn CacheBackend,
    table: &str,
    scopes: &[Scope],
    active_only: bool,
) -> Result<Vec<ActiveRow>> {
    let key = active_snippets_key(scopes, table);

    if let Some(blob) = cache.get(&key) {
        return serde_json::from_str(&blob).map_err(|e| from_serde("cache_decode", e));
    }

    let rows = snippets::fetch_active_by_scope(conn, table, scopes, active_only)?;
    let blob = serde_json::to_string(&rows).map_err(|e| from_serde("cache_encode", e))?;
    cache.set(&key, blob);
    Ok(rows)
}

/// Invalidate active-snippet entries for one table.
///
/// With an explicit scope list, only that entry is cleared (targeted
/// shared-activation changes); otherwise all precomputed groups are.
pub fn clean_active_snippets_cache(cache: &dyn CacheBackend, table: &str, scopes: Option<&[Scope]>) {
    match scopes {
        Some(scopes) => cache.delete(&active_snippets_key(scopes, table)),
        None => {
            for group in invalidation_groups() {
                cache.delete(&active_snippets_key(&group, table));
            }
        }
    }
}

/// Flush every cache entry referencing one table.
///
/// Called synchronously after any successful write to that table, so the
/// next read observes the new state.
pub fn clean_snippets_cache(cache: &dyn CacheBackend, table: &str) {
    cache.delete(&all_snippets_key(table));
    cache.delete(&all_tags_key(table));
    clean_active_snippets_cache(cache, table, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, schema, snippets::ActiveRow};
    use snipstash_core::model::Snippet;

    #[test]
    fn test_key_is_order_insensitive() {
        let a = active_snippets_key(&[Scope::Global, Scope::SingleUse, Scope::Admin], "t");
        let b = active_snippets_key(&[Scope::Admin, Scope::Global, Scope::SingleUse], "t");
        assert_eq!(a, b);

        // Different scope sets must not collide
        let c = active_snippets_key(&[Scope::HeadContent, Scope::FooterContent], "t");
        assert_ne!(a, c);
    }

    #[test]
    fn test_read_through_and_invalidation() {
        let conn = db::open_in_memory().unwrap();
        schema::create_table(&conn, "site1_snippets").unwrap();
        let cache = MemoryCache::new();

        let mut snippet = Snippet::new();
        snippet.name = "cached".to_string();
        snippet.scope = Scope::Global;
        snippet.active = true;
        crate::snippets::insert_snippet(&conn, "site1_snippets", &snippet).unwrap();

        let scopes = [Scope::Global, Scope::SingleUse, Scope::FrontEnd];
        let rows =
            get_active_snippets(&conn, &cache, "site1_snippets", &scopes, true).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(cache.len(), 1);

        // Serve a poisoned entry to prove the second read hits the cache
        let key = active_snippets_key(&scopes, "site1_snippets");
        let marker = vec![ActiveRow {
            id: 999,
            code: String::new(),
            scope: Scope::Global,
            active: true,
        }];
        cache.set(&key, serde_json::to_string(&marker).unwrap());
        let rows =
            get_active_snippets(&conn, &cache, "site1_snippets", &scopes, true).unwrap();
        assert_eq!(rows[0].id, 999);

        // Group invalidation clears the entry, next read goes to the store
        clean_snippets_cache(&cache, "site1_snippets");
        let rows =
            get_active_snippets(&conn, &cache, "site1_snippets", &scopes, true).unwrap();
        assert_ne!(rows[0].id, 999);
    }

    #[test]
    fn test_targeted_invalidation_leaves_other_groups() {
        let cache = MemoryCache::new();
        let head = [Scope::HeadContent, Scope::FooterContent];
        let admin = [Scope::Global, Scope::SingleUse, Scope::Admin];

        cache.set(&active_snippets_key(&head, "t"), "[]".to_string());
        cache.set(&active_snippets_key(&admin, "t"), "[]".to_string());

        clean_active_snippets_cache(&cache, "t", Some(&head));
        assert!(cache.get(&active_snippets_key(&head, "t")).is_none());
        assert!(cache.get(&active_snippets_key(&admin, "t")).is_some());
    }
}
