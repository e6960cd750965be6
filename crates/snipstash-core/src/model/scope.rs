use serde::{Deserialize, Serialize};

/// Scope determines when a snippet is eligible to run and implies its type.
///
/// The canonical string form is what gets stored in the database and in
/// export files. The snippet type is never stored: it is derived from the
/// scope's string suffix (see [`SnippetType::from_scope_str`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    /// Runs on every request
    #[serde(rename = "global")]
    Global,
    /// Runs only in admin/backoffice context
    #[serde(rename = "admin")]
    Admin,
    /// Runs only in public-facing context
    #[serde(rename = "front-end")]
    FrontEnd,
    /// Runs once, then self-deactivates at the moment of selection
    #[serde(rename = "single-use")]
    SingleUse,
    /// Rendered only when explicitly embedded in content
    #[serde(rename = "content")]
    Content,
    /// Rendered in the page head
    #[serde(rename = "head-content")]
    HeadContent,
    /// Rendered in the page footer
    #[serde(rename = "footer-content")]
    FooterContent,
    /// Stylesheet, admin context
    #[serde(rename = "admin-css")]
    AdminCss,
    /// Stylesheet, front-end context
    #[serde(rename = "site-css")]
    SiteCss,
    /// Script injected in the page head
    #[serde(rename = "site-head-js")]
    SiteHeadJs,
    /// Script injected in the page footer
    #[serde(rename = "site-footer-js")]
    SiteFooterJs,
}

impl Scope {
    /// Canonical string form, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::Admin => "admin",
            Scope::FrontEnd => "front-end",
            Scope::SingleUse => "single-use",
            Scope::Content => "content",
            Scope::HeadContent => "head-content",
            Scope::FooterContent => "footer-content",
            Scope::AdminCss => "admin-css",
            Scope::SiteCss => "site-css",
            Scope::SiteHeadJs => "site-head-js",
            Scope::SiteFooterJs => "site-footer-js",
        }
    }

    /// Parse a canonical scope string. Returns None for unknown values.
    pub fn parse(value: &str) -> Option<Scope> {
        Self::all().iter().copied().find(|s| s.as_str() == value)
    }

    /// List of all valid scopes
    pub fn all() -> [Scope; 11] {
        [
            Scope::Global,
            Scope::Admin,
            Scope::FrontEnd,
            Scope::SingleUse,
            Scope::Content,
            Scope::HeadContent,
            Scope::FooterContent,
            Scope::AdminCss,
            Scope::SiteCss,
            Scope::SiteHeadJs,
            Scope::SiteFooterJs,
        ]
    }

    /// The type family implied by this scope
    pub fn snippet_type(&self) -> SnippetType {
        SnippetType::from_scope_str(self.as_str())
    }

    /// Human-readable description of the scope
    pub fn description(&self) -> &'static str {
        match self {
            Scope::Global => "Global function",
            Scope::Admin => "Admin function",
            Scope::FrontEnd => "Front-end function",
            Scope::SingleUse => "Single-use function",
            Scope::Content => "Content",
            Scope::HeadContent => "Head content",
            Scope::FooterContent => "Footer content",
            Scope::AdminCss => "Admin styles",
            Scope::SiteCss => "Front-end styles",
            Scope::SiteHeadJs => "Head scripts",
            Scope::SiteFooterJs => "Footer scripts",
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Global
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four snippet type families. Derived from scope, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetType {
    Php,
    Html,
    Css,
    Js,
}

impl SnippetType {
    /// Derive the type family from a scope's canonical string form.
    ///
    /// Pure suffix match: `-css` is a stylesheet, `-js` a script, a
    /// trailing `content` is markup, everything else is imperative code.
    pub fn from_scope_str(scope: &str) -> SnippetType {
        if scope.ends_with("-css") {
            SnippetType::Css
        } else if scope.ends_with("-js") {
            SnippetType::Js
        } else if scope.ends_with("content") {
            SnippetType::Html
        } else {
            SnippetType::Php
        }
    }

    /// The type name, which doubles as a filename extension
    pub fn as_str(&self) -> &'static str {
        match self {
            SnippetType::Php => "php",
            SnippetType::Html => "html",
            SnippetType::Css => "css",
            SnippetType::Js => "js",
        }
    }

    /// Human-readable label for the type family
    pub fn label(&self) -> &'static str {
        match self {
            SnippetType::Php => "Functions",
            SnippetType::Html => "Content",
            SnippetType::Css => "Styles",
            SnippetType::Js => "Scripts",
        }
    }
}

impl std::fmt::Display for SnippetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
