//! Domain models for snippets

pub mod scope;
pub mod snippet;
pub mod tags;

pub use scope::{Scope, SnippetType};
pub use snippet::Snippet;
pub use tags::{build_tags_vec, tags_list};
