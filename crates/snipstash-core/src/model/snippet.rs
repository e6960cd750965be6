use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CodeError;

use super::scope::{Scope, SnippetType};
use super::tags;

/// A stored code snippet.
///
/// All fields are plain stored data; derived attributes (type, language,
/// display name, tag list form) are pure functions computed on demand and
/// never cached in the struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Database ID. 0 means the snippet has never been persisted.
    pub id: i64,

    /// Display title
    pub name: String,

    /// Description, optionally rich text
    pub desc: String,

    /// Raw source text
    pub code: String,

    /// Normalized tag list
    pub tags: Vec<String>,

    /// When the snippet is eligible to run; also implies its type
    pub scope: Scope,

    /// Execution priority: lower runs first, ties broken by ID
    pub priority: i32,

    /// Whether the snippet is flagged active in its own row
    pub active: bool,

    /// True if the snippet lives in the tenant-shared table
    pub network: bool,

    /// Whether this network snippet is shared for opt-in per-site
    /// activation. Only meaningful when `network` is true.
    pub shared_network: bool,

    /// Last modification time (UTC). None until first saved.
    pub modified: Option<DateTime<Utc>>,

    /// Error recorded by the most recent code validation, if any
    pub code_error: Option<CodeError>,
}

impl Snippet {
    /// Create a new, unsaved snippet with default field values
    pub fn new() -> Self {
        Self {
            id: 0,
            name: String::new(),
            desc: String::new(),
            code: String::new(),
            tags: Vec::new(),
            scope: Scope::default(),
            priority: 10,
            active: false,
            network: false,
            shared_network: false,
            modified: None,
            code_error: None,
        }
    }

    /// Check if this snippet has ever been persisted
    pub fn is_saved(&self) -> bool {
        self.id > 0
    }

    /// The type family implied by the snippet's scope
    pub fn snippet_type(&self) -> SnippetType {
        self.scope.snippet_type()
    }

    /// The language tag for the snippet's code, as a filename extension
    pub fn lang(&self) -> &'static str {
        self.snippet_type().as_str()
    }

    /// The snippet title, or a placeholder if none is set
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Untitled #{}", self.id)
        } else {
            self.name.clone()
        }
    }

    /// The tags in comma-separated storage/display form
    pub fn tags_list(&self) -> String {
        tags::tags_list(&self.tags)
    }

    /// Replace the tag set from a free-text delimited string
    pub fn set_tags(&mut self, raw: &str) {
        self.tags = tags::build_tags_vec(raw);
    }

    /// Add a single tag, keeping the list deduplicated
    pub fn add_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Stamp the last-modified time with the current time
    pub fn update_modified(&mut self) {
        self.modified = Some(Utc::now());
    }
}

impl Default for Snippet {
    fn default() -> Self {
        Self::new()
    }
}
