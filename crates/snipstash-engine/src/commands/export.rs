//! Snippet export and import
//!
//! The interchange document is JSON: a small header plus a list of
//! snippets stripped of identity and activation state. Imports are
//! tolerant of missing fields and always land inactive, so a bulk import
//! can never execute anything by itself.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use snipstash_core::errors::{Result, SnipError};
use snipstash_core::model::{build_tags_vec, Snippet, SnippetType};

use crate::commands::snippet_ops::{get_snippets, save_snippet};
use crate::env::SnippetEnv;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How an import treats an incoming snippet whose name already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DupAction {
    /// Drop the incoming duplicate
    Skip,
    /// Import it anyway as a new snippet
    #[default]
    Ignore,
    /// Overwrite the existing snippet in place
    Replace,
}

/// Top-level interchange document.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Producing application and version
    pub generator: String,
    /// Creation time of the document
    pub date_created: String,
    pub snippets: Vec<ExportSnippet>,
}

/// One snippet as it travels in an interchange document.
///
/// Identity (ID) and activation state deliberately do not travel; every
/// field except the name may be absent in foreign documents.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportSnippet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub code: String,
    /// Comma-joined tag list
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default)]
    pub shared_network: bool,
}

fn default_priority() -> i32 {
    10
}

fn format_modified(modified: Option<DateTime<Utc>>) -> Option<String> {
    modified.map(|m| m.format(DATE_FORMAT).to_string())
}

fn parse_modified(modified: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = modified?;
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Normalize line endings so documents from other platforms import
/// cleanly.
fn normalize_newlines(code: &str) -> String {
    code.replace("\r\n", "\n")
}

impl ExportSnippet {
    fn from_snippet(snippet: &Snippet) -> Self {
        Self {
            name: snippet.name.clone(),
            desc: snippet.desc.clone(),
            code: snippet.code.clone(),
            tags: snippet.tags_list(),
            scope: snippet.scope.as_str().to_string(),
            priority: snippet.priority,
            modified: format_modified(snippet.modified),
            shared_network: snippet.shared_network,
        }
    }

    fn into_snippet(self, network: bool) -> Snippet {
        let mut snippet = Snippet::new();
        snippet.name = self.name;
        snippet.desc = self.desc;
        snippet.code = normalize_newlines(&self.code);
        snippet.tags = build_tags_vec(&self.tags);
        snippet.scope = snipstash_core::model::Scope::parse(&self.scope).unwrap_or_default();
        snippet.priority = self.priority;
        snippet.modified = parse_modified(self.modified.as_deref());
        snippet.network = network;
        snippet.shared_network = network && self.shared_network;
        // Imported snippets never arrive active
        snippet.active = false;
        snippet
    }
}

fn generator() -> String {
    format!("Snipstash v{}", env!("CARGO_PKG_VERSION"))
}

/// Build an interchange document for the given snippets.
///
/// Empty `ids` exports the whole table.
pub fn export_snippets(
    env: &SnippetEnv<'_>,
    ids: &[i64],
    network: bool,
) -> Result<ExportDocument> {
    let snippets = get_snippets(env, ids, network)?;

    Ok(ExportDocument {
        generator: generator(),
        date_created: Utc::now().format("%Y-%m-%d %H:%M").to_string(),
        snippets: snippets.iter().map(ExportSnippet::from_snippet).collect(),
    })
}

/// Serialize an interchange document to pretty JSON
pub fn export_snippets_json(env: &SnippetEnv<'_>, ids: &[i64], network: bool) -> Result<String> {
    let doc = export_snippets(env, ids, network)?;
    serde_json::to_string_pretty(&doc).map_err(|e| SnipError::Serialization {
        op: "export_snippets".to_string(),
        message: e.to_string(),
    })
}

/// Export snippets as a plain source file rather than a document.
///
/// Imperative and markup snippets concatenate into one annotated file;
/// style and script snippets concatenate into comment-separated blocks.
pub fn export_code(env: &SnippetEnv<'_>, ids: &[i64], network: bool) -> Result<String> {
    let snippets = get_snippets(env, ids, network)?;
    let mut out = String::new();

    let first_type = snippets
        .first()
        .map(Snippet::snippet_type)
        .unwrap_or(SnippetType::Php);

    if matches!(first_type, SnippetType::Php | SnippetType::Html) {
        out.push_str("<?php\n");
        for snippet in &snippets {
            out.push_str("\n/**\n");
            out.push_str(&format!(" * {}\n", snippet.display_name()));
            for line in snippet.desc.lines() {
                out.push_str(&format!(" * {}\n", line));
            }
            out.push_str(" */\n");
            out.push_str(&snippet.code);
            out.push('\n');
        }
    } else {
        for snippet in &snippets {
            out.push_str(&format!("/* {}", snippet.display_name()));
            if !snippet.desc.is_empty() {
                out.push_str(&format!("\n\n{}", snippet.desc));
            }
            out.push_str(" */\n\n");
            out.push_str(&snippet.code);
            out.push_str("\n\n");
        }
    }

    Ok(out)
}

/// Parse an interchange document from JSON text
pub fn parse_export_json(json: &str) -> Result<ExportDocument> {
    serde_json::from_str(json).map_err(|e| SnipError::Serialization {
        op: "parse_export".to_string(),
        message: e.to_string(),
    })
}

/// Import the snippets from an interchange document.
///
/// Duplicate handling matches names against existing snippets in the
/// target table. Returns the IDs of the snippets written.
pub fn import_snippets(
    env: &SnippetEnv<'_>,
    doc: ExportDocument,
    network: bool,
    dup_action: DupAction,
) -> Result<Vec<i64>> {
    let network = env.resolve_network(network);

    let existing = match dup_action {
        DupAction::Ignore => Vec::new(),
        _ => get_snippets(env, &[], network)?,
    };

    let mut imported = Vec::new();

    for entry in doc.snippets {
        let mut snippet = entry.into_snippet(network);

        match dup_action {
            DupAction::Skip => {
                if existing.iter().any(|e| e.name == snippet.name) {
                    tracing::debug!(name = %snippet.name, "skipping duplicate snippet");
                    continue;
                }
            }
            DupAction::Replace => {
                if let Some(found) = existing.iter().find(|e| e.name == snippet.name) {
                    snippet.id = found.id;
                }
            }
            DupAction::Ignore => {}
        }

        let saved = save_snippet(env, snippet)?;
        imported.push(saved.id);
    }

    tracing::info!(count = imported.len(), "snippets imported");
    Ok(imported)
}

/// Parse and import in one step
pub fn import_snippets_json(
    env: &SnippetEnv<'_>,
    json: &str,
    network: bool,
    dup_action: DupAction,
) -> Result<Vec<i64>> {
    let doc = parse_export_json(json)?;
    import_snippets(env, doc, network, dup_action)
}
