//! Domain error types
//!
//! This module defines error types specific to domain operations, such as
//! validation failures for identifiers and malformed virtual paths.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid drive identifier
    #[error("Invalid drive ID: {0}")]
    InvalidDriveId(String),

    /// Invalid drive item identifier
    #[error("Invalid item ID: {0}")]
    InvalidItemId(String),

    /// Invalid delta token
    #[error("Invalid delta token: {0}")]
    InvalidDeltaToken(String),

    /// Invalid path segment or malformed URI
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The URI does not belong to this filesystem
    #[error("Unsupported path scheme: {0}")]
    UnsupportedScheme(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),
}
