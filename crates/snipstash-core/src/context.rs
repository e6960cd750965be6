//! Request context provider
//!
//! The engine learns about the surrounding request through this trait:
//! whether it is an administrative request, which snippet (if any) is
//! currently open for editing, the active site identity, and whether the
//! operator has engaged the safe-mode kill switch.

/// Identity of a tenant site. Site 1 is the default single-site identity.
pub type SiteId = i64;

/// A snippet currently open for editing in this request.
///
/// The execution engine spares it from execution so an author never has
/// their stale persisted version run alongside the in-progress edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditingSnippet {
    /// Snippet ID being edited
    pub id: i64,
    /// Whether the edit targets the shared table
    pub network: bool,
}

/// Host-provided view of the current request.
pub trait RequestContext {
    /// Whether the request is an administrative/backoffice request
    fn is_admin(&self) -> bool;

    /// The snippet currently open for editing, if any
    fn editing(&self) -> Option<EditingSnippet> {
        None
    }

    /// The active site identity
    fn site(&self) -> SiteId;

    /// Global kill switch: when true, all snippet execution is
    /// suppressed while management operations keep working
    fn safe_mode(&self) -> bool {
        false
    }
}

/// Fixed request context, for tests and CLI use.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticContext {
    pub admin: bool,
    pub editing: Option<EditingSnippet>,
    pub site: SiteId,
    pub safe_mode: bool,
}

impl StaticContext {
    /// Context for a public request against the given site
    pub fn front_end(site: SiteId) -> Self {
        Self {
            admin: false,
            editing: None,
            site,
            safe_mode: false,
        }
    }

    /// Context for an administrative request against the given site
    pub fn admin(site: SiteId) -> Self {
        Self {
            admin: true,
            editing: None,
            site,
            safe_mode: false,
        }
    }
}

impl RequestContext for StaticContext {
    fn is_admin(&self) -> bool {
        self.admin
    }

    fn editing(&self) -> Option<EditingSnippet> {
        self.editing
    }

    fn site(&self) -> SiteId {
        self.site
    }

    fn safe_mode(&self) -> bool {
        self.safe_mode
    }
}
