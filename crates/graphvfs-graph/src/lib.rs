//! GraphVFS Graph - Microsoft Graph drive API client
//!
//! Provides an async client for:
//! - Drive discovery and folder listing (picker support)
//! - Path-addressed metadata, download, upload and delete
//! - Id-addressed folder creation, move and copy
//! - Delta queries for change tracking
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP plumbing (URL building, paging, errors)
//! - [`items`] - Drive and item operations
//! - [`delta`] - Delta queries and the [`IDeltaSource`] adapter
//! - [`model`] - Graph JSON resource types and their domain conversions
//! - [`token`] - Bearer token sources
//!
//! [`IDeltaSource`]: graphvfs_core::ports::IDeltaSource

pub mod client;
pub mod delta;
pub mod items;
pub mod model;
pub mod token;

pub use client::GraphClient;

use thiserror::Error;

/// Errors that can occur when communicating with the Microsoft Graph API
#[derive(Debug, Error)]
pub enum GraphError {
    /// The server answered with a non-success status
    #[error("Request to {url} failed with status {status}: {body}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// Raw response body (usually a Graph error object)
        body: String,
        /// Request URL
        url: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The token source could not provide a bearer token
    #[error("Access token unavailable: {0}")]
    TokenUnavailable(String),
}

impl GraphError {
    /// HTTP status of a failed request, if the server answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for a 404 answer, the only not-found signal the adapter trusts
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
