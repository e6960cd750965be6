use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using SnipError
pub type Result<T> = std::result::Result<T, SnipError>;

/// A code validation error: message plus 1-based line number.
///
/// Stored against a snippet after a failed validation so the admin
/// surface can point at the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeError {
    /// Human-readable description of the first error found
    pub message: String,
    /// 1-based line number where the error was detected
    pub line: u32,
}

impl std::fmt::Display for CodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on line {}", self.message, self.line)
    }
}

/// Canonical error taxonomy for snippet operations
///
/// Each variant maps to a stable error code for programmatic handling.
/// Store reads never produce `NotFound` for missing rows (they return
/// sentinel values instead); `NotFound` is reserved for operations that
/// require an existing snippet, such as activation.
#[derive(Debug, Error)]
pub enum SnipError {
    /// Referenced snippet does not exist in the requested table
    #[error("Snippet not found: {id} in {table}")]
    NotFound { id: i64, table: String },

    /// Snippet code failed the static syntax check
    #[error("Code validation failed: {0}")]
    Validation(CodeError),

    /// Runtime failure while executing a snippet's code
    #[error("Execution of snippet {id} failed: {message}")]
    Execution { id: i64, message: String },

    /// Storage driver reported failure, or a write affected no rows
    #[error("Storage operation failed during {op}: {message}")]
    Storage { op: String, message: String },

    /// Cache blob or interchange document could not be (de)serialized
    #[error("Serialization failed during {op}: {message}")]
    Serialization { op: String, message: String },

    /// Filesystem failure (export/import files)
    #[error("IO failure during {op}: {source}")]
    Io {
        op: String,
        #[source]
        source: std::io::Error,
    },
}

impl SnipError {
    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SnipError::NotFound { .. } => "ERR_NOT_FOUND",
            SnipError::Validation(_) => "ERR_VALIDATION",
            SnipError::Execution { .. } => "ERR_EXECUTION",
            SnipError::Storage { .. } => "ERR_STORAGE",
            SnipError::Serialization { .. } => "ERR_SERIALIZATION",
            SnipError::Io { .. } => "ERR_IO",
        }
    }
}
