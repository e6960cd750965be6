//! Integration tests for the snippet lifecycle operations

use rusqlite::Connection;
use snipstash_core::errors::SnipError;
use snipstash_core::model::{Scope, Snippet};
use snipstash_engine::commands::snippet_ops;
use snipstash_engine::SnippetEnv;
use snipstash_store::cache::{self, CacheBackend, MemoryCache};
use snipstash_store::options::{self, OptionScope, RECENTLY_ACTIVATED_SNIPPETS};
use snipstash_store::tables::TableCheckCache;
use snipstash_store::db;

fn setup() -> (Connection, MemoryCache) {
    (db::open_in_memory().unwrap(), MemoryCache::new())
}

fn env<'a>(conn: &'a Connection, memcache: &'a MemoryCache) -> SnippetEnv<'a> {
    let env = SnippetEnv::new(conn, memcache, 1, false);
    env.bootstrap(&TableCheckCache::new()).unwrap();
    env
}

fn sample(name: &str, code: &str) -> Snippet {
    let mut snippet = Snippet::new();
    snippet.name = name.to_string();
    snippet.code = code.to_string();
    snippet
}

// ============================================================
// Create / read
// ============================================================

#[test]
fn test_save_assigns_id_and_round_trips() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let mut snippet = sample("Greeting", "echo 'hi';");
    snippet.set_tags("demo, greeting");
    let saved = snippet_ops::save_snippet(&env, snippet).unwrap();

    assert!(saved.is_saved());
    assert!(saved.modified.is_some());

    let loaded = snippet_ops::get_snippet(&env, saved.id, false).unwrap();
    assert_eq!(loaded.name, "Greeting");
    assert_eq!(loaded.tags, vec!["demo", "greeting"]);
    assert!(!loaded.active);
}

#[test]
fn test_get_missing_snippet_is_empty_not_error() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let snippet = snippet_ops::get_snippet(&env, 999, false).unwrap();
    assert!(!snippet.is_saved());
    assert_eq!(snippet.id, 0);

    let snippet = snippet_ops::get_snippet(&env, 0, false).unwrap();
    assert!(!snippet.is_saved());
}

#[test]
fn test_get_snippets_filters_and_caches_full_list() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let a = snippet_ops::save_snippet(&env, sample("a", "")).unwrap();
    let b = snippet_ops::save_snippet(&env, sample("b", "")).unwrap();
    snippet_ops::save_snippet(&env, sample("c", "")).unwrap();

    let subset = snippet_ops::get_snippets(&env, &[a.id, b.id], false).unwrap();
    assert_eq!(subset.len(), 2);
    // Subset requests never populate the full-list cache
    assert!(memcache.get(&cache::all_snippets_key("site1_snippets")).is_none());

    let all = snippet_ops::get_snippets(&env, &[], false).unwrap();
    assert_eq!(all.len(), 3);
    assert!(memcache.get(&cache::all_snippets_key("site1_snippets")).is_some());
}

#[test]
fn test_write_invalidates_list_cache() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    snippet_ops::save_snippet(&env, sample("first", "")).unwrap();
    snippet_ops::get_snippets(&env, &[], false).unwrap();
    assert!(memcache.get(&cache::all_snippets_key("site1_snippets")).is_some());

    snippet_ops::save_snippet(&env, sample("second", "")).unwrap();
    assert!(memcache.get(&cache::all_snippets_key("site1_snippets")).is_none());

    // The read immediately following the write observes the new row
    let all = snippet_ops::get_snippets(&env, &[], false).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_all_tags_union() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let mut one = sample("one", "");
    one.set_tags("red, blue");
    snippet_ops::save_snippet(&env, one).unwrap();
    let mut two = sample("two", "");
    two.set_tags("blue, green");
    snippet_ops::save_snippet(&env, two).unwrap();

    let tags = snippet_ops::get_all_snippet_tags(&env, false).unwrap();
    assert_eq!(tags, vec!["red", "blue", "green"]);
}

// ============================================================
// Activation
// ============================================================

#[test]
fn test_activate_requires_valid_code() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let saved = snippet_ops::save_snippet(&env, sample("broken", "if (")).unwrap();
    let err = snippet_ops::activate_snippet(&env, saved.id, false).unwrap_err();
    assert!(matches!(err, SnipError::Validation(_)));

    // The snippet stays inactive after the failed activation
    let loaded = snippet_ops::get_snippet(&env, saved.id, false).unwrap();
    assert!(!loaded.active);
}

#[test]
fn test_activate_missing_snippet_is_not_found() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let err = snippet_ops::activate_snippet(&env, 42, false).unwrap_err();
    assert!(matches!(err, SnipError::NotFound { id: 42, .. }));
}

#[test]
fn test_activate_and_deactivate() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let saved = snippet_ops::save_snippet(&env, sample("ok", "echo 1;")).unwrap();

    let activated = snippet_ops::activate_snippet(&env, saved.id, false).unwrap();
    assert!(activated.active);
    assert!(snippet_ops::get_snippet(&env, saved.id, false).unwrap().active);

    let deactivated = snippet_ops::deactivate_snippet(&env, saved.id, false).unwrap();
    assert!(!deactivated.active);
    assert!(!snippet_ops::get_snippet(&env, saved.id, false).unwrap().active);
}

#[test]
fn test_bulk_activation_excludes_invalid_silently() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let good = snippet_ops::save_snippet(&env, sample("good", "echo 1;")).unwrap();
    let bad = snippet_ops::save_snippet(&env, sample("bad", "if (")).unwrap();
    let also_good = snippet_ops::save_snippet(&env, sample("also", "echo 2;")).unwrap();

    let activated = snippet_ops::activate_snippets(&env, &[good.id, bad.id, also_good.id], false)
        .unwrap();
    assert_eq!(activated, vec![good.id, also_good.id]);

    assert!(snippet_ops::get_snippet(&env, good.id, false).unwrap().active);
    assert!(!snippet_ops::get_snippet(&env, bad.id, false).unwrap().active);
    assert!(snippet_ops::get_snippet(&env, also_good.id, false).unwrap().active);
}

// ============================================================
// Save semantics
// ============================================================

#[test]
fn test_save_trims_surrounding_tags() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let saved = snippet_ops::save_snippet(&env, sample("pasted", "<?php echo 1; ?>")).unwrap();
    assert_eq!(saved.code.trim(), "echo 1;");
}

#[test]
fn test_save_defuses_active_snippet_with_invalid_code() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let saved = snippet_ops::save_snippet(&env, sample("flaky", "echo 1;")).unwrap();
    snippet_ops::activate_snippet(&env, saved.id, false).unwrap();

    let mut edited = snippet_ops::get_snippet(&env, saved.id, false).unwrap();
    edited.code = "function broken( {".to_string();
    let resaved = snippet_ops::save_snippet(&env, edited).unwrap();

    assert!(!resaved.active);
    assert!(resaved.code_error.is_some());
    assert!(!snippet_ops::get_snippet(&env, saved.id, false).unwrap().active);
}

#[test]
fn test_save_with_stale_id_is_storage_error() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let saved = snippet_ops::save_snippet(&env, sample("fleeting", "")).unwrap();
    snippet_ops::delete_snippet(&env, saved.id, false).unwrap();

    // The row is gone, so the update writes nothing
    let err = snippet_ops::save_snippet(&env, saved).unwrap_err();
    assert!(matches!(err, SnipError::Storage { .. }));
    assert_eq!(err.code(), "ERR_STORAGE");
}

#[test]
fn test_clone_produces_inactive_copy() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let mut original = sample("Original", "echo 1;");
    original.set_tags("a, b");
    let original = snippet_ops::save_snippet(&env, original).unwrap();
    snippet_ops::activate_snippet(&env, original.id, false).unwrap();

    let copy = snippet_ops::clone_snippet(&env, original.id, false).unwrap();
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.name, "Original [CLONE]");
    assert_eq!(copy.tags, vec!["a", "b"]);
    assert!(!copy.active);
}

#[test]
fn test_delete_snippet() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let saved = snippet_ops::save_snippet(&env, sample("gone", "")).unwrap();
    snippet_ops::delete_snippet(&env, saved.id, false).unwrap();
    assert!(!snippet_ops::get_snippet(&env, saved.id, false).unwrap().is_saved());

    let err = snippet_ops::delete_snippet(&env, saved.id, false).unwrap_err();
    assert!(matches!(err, SnipError::NotFound { .. }));
}

// ============================================================
// Recently-activated record
// ============================================================

#[test]
fn test_deactivation_is_recorded_and_pruned_by_ttl() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let saved = snippet_ops::save_snippet(&env, sample("tracked", "echo 1;")).unwrap();
    snippet_ops::activate_snippet(&env, saved.id, false).unwrap();
    snippet_ops::deactivate_snippet(&env, saved.id, false).unwrap();

    let recent = snippet_ops::recently_activated(
        &env,
        false,
        snippet_ops::DEFAULT_RECENTLY_ACTIVE_TTL_SECS,
    )
    .unwrap();
    assert!(recent.contains_key(&saved.id));

    // Backdate the entry past the TTL horizon and confirm the prune
    let mut map = recent;
    map.insert(saved.id, 1_000);
    options::set_option(&conn, OptionScope::Site(1), RECENTLY_ACTIVATED_SNIPPETS, &map).unwrap();

    let recent = snippet_ops::recently_activated(
        &env,
        false,
        snippet_ops::DEFAULT_RECENTLY_ACTIVE_TTL_SECS,
    )
    .unwrap();
    assert!(recent.is_empty());

    // The prune wrote back, so the stored record is empty too
    let stored: std::collections::BTreeMap<i64, i64> =
        options::get_option(&conn, OptionScope::Site(1), RECENTLY_ACTIVATED_SNIPPETS)
            .unwrap()
            .unwrap();
    assert!(stored.is_empty());
}

// ============================================================
// Scope-derived typing
// ============================================================

#[test]
fn test_non_php_snippets_skip_validation() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    // Unbalanced braces are fine in CSS; the type gate must not validate
    let mut style = sample("style", "body { color: red;");
    style.scope = Scope::SiteCss;
    let saved = snippet_ops::save_snippet(&env, style).unwrap();

    let activated = snippet_ops::activate_snippet(&env, saved.id, false).unwrap();
    assert!(activated.active);
}
