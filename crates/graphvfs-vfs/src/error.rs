//! Error types for the filesystem adapter.
//!
//! Remote failures are translated at each call site: a 404 becomes
//! [`VfsError::NotFound`] (or success, for delete) and everything else is
//! passed through as [`VfsError::Remote`].

use graphvfs_core::domain::{DomainError, VirtualPath};
use graphvfs_graph::GraphError;
use thiserror::Error;

/// Errors returned by [`GraphFileSystem`](crate::GraphFileSystem) operations
#[derive(Error, Debug)]
pub enum VfsError {
    /// No item exists at the URI
    #[error("not found: {0}")]
    NotFound(String),

    /// The URI could not be parsed or uses a foreign scheme
    #[error("invalid URI: {0}")]
    InvalidUri(#[from] DomainError),

    /// The operation makes no sense for the given paths (e.g. renaming a root)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Any other remote failure, unchanged
    #[error(transparent)]
    Remote(#[from] GraphError),
}

impl VfsError {
    /// Maps a remote failure for `path`, turning 404 into `NotFound`
    pub(crate) fn from_remote(path: &VirtualPath, err: GraphError) -> Self {
        if err.is_not_found() {
            VfsError::NotFound(path.to_uri())
        } else {
            VfsError::Remote(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::NotFound(_))
    }
}

impl From<&VfsError> for std::io::ErrorKind {
    fn from(err: &VfsError) -> std::io::ErrorKind {
        match err {
            VfsError::NotFound(_) => std::io::ErrorKind::NotFound,
            VfsError::InvalidUri(_) | VfsError::InvalidArgument(_) => {
                std::io::ErrorKind::InvalidInput
            }
            VfsError::Remote(e) => match e.status() {
                Some(401) | Some(403) => std::io::ErrorKind::PermissionDenied,
                Some(409) => std::io::ErrorKind::AlreadyExists,
                _ => std::io::ErrorKind::Other,
            },
        }
    }
}
