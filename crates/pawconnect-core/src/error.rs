//! Error types for PawConnect.
//!
//! Every fallible operation outside the HTTP layer returns one of these. All
//! variants are serializable so they can be embedded in API responses and
//! structured log fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::VerificationStatus;

/// Result type alias using PawConnectError as the error type.
pub type Result<T> = std::result::Result<T, PawConnectError>;

/// Top-level error type for PawConnect operations.
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum PawConnectError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Directory data source errors
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Application review errors
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by a directory data source.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DirectoryError {
    /// The backing service could not be reached or answered with a failure
    #[error("Directory unavailable: {reason}")]
    Unavailable { reason: String },

    /// No shelter with the given id
    #[error("Shelter not found: {id}")]
    NotFound { id: String },

    /// A shelter with the same identity already exists
    #[error("Shelter already registered: {email}")]
    AlreadyRegistered { email: String },

    /// A write was rejected because the shelter is in the wrong state
    #[error("Operation not allowed for shelter {id}: {reason}")]
    NotAllowed { id: String, reason: String },
}

impl DirectoryError {
    /// Creates an unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Creates a not allowed error.
    pub fn not_allowed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotAllowed {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the caller may retry later.
    pub fn is_transient(&self) -> bool {
        matches!(self, DirectoryError::Unavailable { .. })
    }
}

/// Errors raised by the application review workflow.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReviewError {
    /// The application does not exist
    #[error("Application not found: {id}")]
    NotFound { id: String },

    /// Only pending applications can be decided
    #[error("Application {id} is already {status}")]
    AlreadyDecided {
        id: String,
        status: VerificationStatus,
    },

    /// A rejection must explain itself
    #[error("Rejection notes are required")]
    MissingNotes,
}

/// Errors related to configuration.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {reason}")]
    InvalidFormat { reason: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_error_transient() {
        assert!(DirectoryError::unavailable("timeout").is_transient());
        assert!(!DirectoryError::not_found("42").is_transient());
    }

    #[test]
    fn test_error_serialization() {
        let err = PawConnectError::Directory(DirectoryError::not_found("shelter-7"));
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("Directory"));
        assert!(json.contains("shelter-7"));
    }

    #[test]
    fn test_review_error_display() {
        let err = ReviewError::AlreadyDecided {
            id: "abc".to_string(),
            status: VerificationStatus::Approved,
        };
        assert_eq!(err.to_string(), "Application abc is already approved");
    }
}
