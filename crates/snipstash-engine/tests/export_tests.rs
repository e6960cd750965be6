//! Integration tests for export and import

use rusqlite::Connection;
use snipstash_core::model::{Scope, Snippet};
use snipstash_engine::commands::export::{self, DupAction};
use snipstash_engine::commands::snippet_ops;
use snipstash_engine::SnippetEnv;
use snipstash_store::cache::MemoryCache;
use snipstash_store::db;
use snipstash_store::tables::TableCheckCache;

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
// Export
// ============================================================

#[test]
fn test_export_document_shape() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let mut snippet = sample("Exported", "echo 1;");
    snippet.set_tags("a, b");
    snippet.priority = 5;
    let saved = snippet_ops::save_snippet(&env, snippet).unwrap();
    snippet_ops::activate_snippet(&env, saved.id, false).unwrap();

    let doc = export::export_snippets(&env, &[], false).unwrap();
    assert!(doc.generator.starts_with("Snipstash v"));
    assert_eq!(doc.snippets.len(), 1);

    let entry = &doc.snippets[0];
    assert_eq!(entry.name, "Exported");
    assert_eq!(entry.tags, "a, b");
    assert_eq!(entry.scope, "global");
    assert_eq!(entry.priority, 5);
    assert!(entry.modified.is_some());
}

#[test]
fn test_export_subset_by_id() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let keep = snippet_ops::save_snippet(&env, sample("keep", "")).unwrap();
    snippet_ops::save_snippet(&env, sample("drop", "")).unwrap();

    let doc = export::export_snippets(&env, &[keep.id], false).unwrap();
    assert_eq!(doc.snippets.len(), 1);
    assert_eq!(doc.snippets[0].name, "keep");
}

#[test]
fn test_export_code_php_file() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let mut snippet = sample("Header snippet", "echo 'header';");
    snippet.desc = "Adds a header".to_string();
    snippet_ops::save_snippet(&env, snippet).unwrap();

    let code = export::export_code(&env, &[], false).unwrap();
    assert!(code.starts_with("<?php\n"));
    assert!(code.contains(" * Header snippet"));
    assert!(code.contains(" * Adds a header"));
    assert!(code.contains("echo 'header';"));
}

#[test]
fn test_export_code_css_blocks() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let mut style = sample("Theme tweaks", "body { margin: 0; }");
    style.scope = Scope::SiteCss;
    snippet_ops::save_snippet(&env, style).unwrap();

    let code = export::export_code(&env, &[], false).unwrap();
    assert!(!code.contains("<?php"));
    assert!(code.contains("/* Theme tweaks"));
    assert!(code.contains("body { margin: 0; }"));
}

// ============================================================
// Import
// ============================================================

#[test]
fn test_import_round_trip_lands_inactive() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let mut snippet = sample("Traveler", "echo 1;");
    snippet.set_tags("x, y");
    snippet.scope = Scope::FrontEnd;
    let saved = snippet_ops::save_snippet(&env, snippet).unwrap();
    snippet_ops::activate_snippet(&env, saved.id, false).unwrap();

    let json = export::export_snippets_json(&env, &[], false).unwrap();
    snippet_ops::delete_snippet(&env, saved.id, false).unwrap();

    let imported = export::import_snippets_json(&env, &json, false, DupAction::Ignore).unwrap();
    assert_eq!(imported.len(), 1);

    let loaded = snippet_ops::get_snippet(&env, imported[0], false).unwrap();
    assert_eq!(loaded.name, "Traveler");
    assert_eq!(loaded.tags, vec!["x", "y"]);
    assert_eq!(loaded.scope, Scope::FrontEnd);
    // Activation state never travels
    assert!(!loaded.active);
}

#[test]
fn test_import_normalizes_crlf() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let json = r#"{
        "generator": "other tool",
        "date_created": "2024-01-01 00:00",
        "snippets": [{"name": "windows", "code": "echo 1;\r\necho 2;"}]
    }"#;

    let imported = export::import_snippets_json(&env, json, false, DupAction::Ignore).unwrap();
    let loaded = snippet_ops::get_snippet(&env, imported[0], false).unwrap();
    assert_eq!(loaded.code, "echo 1;\necho 2;");
}

#[test]
fn test_import_dup_skip() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    snippet_ops::save_snippet(&env, sample("existing", "old")).unwrap();
    let json = export::export_snippets_json(&env, &[], false).unwrap();

    let imported = export::import_snippets_json(&env, &json, false, DupAction::Skip).unwrap();
    assert!(imported.is_empty());
    assert_eq!(snippet_ops::get_snippets(&env, &[], false).unwrap().len(), 1);
}

#[test]
fn test_import_dup_ignore_creates_new_rows() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    snippet_ops::save_snippet(&env, sample("existing", "old")).unwrap();
    let json = export::export_snippets_json(&env, &[], false).unwrap();

    let imported = export::import_snippets_json(&env, &json, false, DupAction::Ignore).unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(snippet_ops::get_snippets(&env, &[], false).unwrap().len(), 2);
}

#[test]
fn test_import_dup_replace_overwrites_in_place() {
    let (conn, memcache) = setup();
    let env = env(&conn, &memcache);

    let original = snippet_ops::save_snippet(&env, sample("shared-name", "old")).unwrap();

    let json = r#"{
        "generator": "other tool",
        "date_created": "2024-01-01 00:00",
        "snippets": [{"name": "shared-name", "code": "new"}]
    }"#;

    let imported = export::import_snippets_json(&env, json, false, DupAction::Replace).unwrap();
    assert_eq!(imported, vec![original.id]);

    let loaded = snippet_ops::get_snippet(&env, original.id, false).unwrap();
    assert_eq!(loaded.code, "new");
    assert_eq!(snippet_ops::get_snippets(&env, &[], false).unwrap().len(), 1);
}
