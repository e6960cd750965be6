//! Passthrough rendering
//!
//! Markup, style, and script snippets never touch the code runner; their
//! stored text is emitted directly into the page. Each render path reads
//! through the cache using one of the precomputed scope groups, so these
//! hot reads stay coherent with snippet writes.

use snipstash_core::errors::Result;
use snipstash_core::model::{Scope, Snippet, SnippetType};

use crate::commands::execute::fetch_candidates;
use crate::commands::snippet_ops::get_snippet;
use crate::env::SnippetEnv;

/// Concatenate the code of active snippets in one scope.
///
/// Each body is framed by newlines so adjacent snippets never run
/// together on one line.
fn concat_scope(env: &SnippetEnv<'_>, group: &[Scope], scope: Scope) -> Result<String> {
    let mut out = String::new();
    for candidate in fetch_candidates(env, group)? {
        if candidate.row.scope == scope {
            out.push('\n');
            out.push_str(&candidate.row.code);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Markup destined for the document head
pub fn render_head_content(env: &SnippetEnv<'_>) -> Result<String> {
    concat_scope(
        env,
        &[Scope::HeadContent, Scope::FooterContent],
        Scope::HeadContent,
    )
}

/// Markup destined for the end of the document body
pub fn render_footer_content(env: &SnippetEnv<'_>) -> Result<String> {
    concat_scope(
        env,
        &[Scope::HeadContent, Scope::FooterContent],
        Scope::FooterContent,
    )
}

/// Combined stylesheet for the admin (true) or public (false) side
pub fn render_stylesheet(env: &SnippetEnv<'_>, admin: bool) -> Result<String> {
    let scope = if admin { Scope::AdminCss } else { Scope::SiteCss };
    concat_scope(env, &[scope], scope)
}

/// Combined script for the head (true) or footer (false) position.
///
/// Script snippets only target the public side.
pub fn render_scripts(env: &SnippetEnv<'_>, head: bool) -> Result<String> {
    let scope = if head {
        Scope::SiteHeadJs
    } else {
        Scope::SiteFooterJs
    };
    concat_scope(env, &[scope], scope)
}

/// Expand a single content snippet referenced by ID (shortcode-style
/// embedding).
///
/// A missing or inactive snippet renders as an HTML comment placeholder
/// rather than an error, so a stale reference never breaks the page.
pub fn render_content_snippet(env: &SnippetEnv<'_>, id: i64, network: bool) -> Result<String> {
    let snippet: Snippet = get_snippet(env, id, network)?;

    if !snippet.is_saved() || !snippet.active || snippet.snippet_type() != SnippetType::Html {
        return Ok(format!("<!-- snippet {} unavailable -->", id));
    }

    Ok(snippet.code)
}
