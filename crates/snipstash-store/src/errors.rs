//! Error handling for snipstash-store
//!
//! Wraps snipstash-core SnipError with store-specific helpers

use snipstash_core::SnipError;

/// Result type alias using SnipError
pub type Result<T> = std::result::Result<T, SnipError>;

/// Create a storage error from rusqlite::Error
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> SnipError {
    SnipError::Storage {
        op: op.to_string(),
        message: err.to_string(),
    }
}

/// Create a storage error with an explicit reason
pub fn storage_error(op: &str, reason: impl Into<String>) -> SnipError {
    SnipError::Storage {
        op: op.to_string(),
        message: reason.into(),
    }
}

/// Create a serialization error from serde_json::Error
pub fn from_serde(op: &str, err: serde_json::Error) -> SnipError {
    SnipError::Serialization {
        op: op.to_string(),
        message: err.to_string(),
    }
}
