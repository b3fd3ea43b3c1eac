//! Virtual path to item id resolution
//!
//! Paths are lookup keys, not identities: every resolution asks the server
//! again, with a single metadata-by-path request. Nothing is cached, since
//! the item behind a path can change between calls.

use std::sync::Arc;

use graphvfs_core::domain::{DriveItem, ItemId, VirtualPath};
use graphvfs_graph::GraphClient;
use tracing::debug;

use crate::error::VfsError;

pub struct PathResolver {
    client: Arc<GraphClient>,
}

impl PathResolver {
    pub fn new(client: Arc<GraphClient>) -> Self {
        Self { client }
    }

    /// Returns the item currently at `path`
    ///
    /// # Errors
    /// `VfsError::NotFound` on a 404, any other remote failure unchanged
    pub async fn lookup(&self, path: &VirtualPath) -> Result<DriveItem, VfsError> {
        self.client
            .get_item_by_path(path)
            .await
            .map_err(|e| VfsError::from_remote(path, e))
    }

    /// Returns the id of the item currently at `path`
    pub async fn resolve(&self, path: &VirtualPath) -> Result<ItemId, VfsError> {
        let item = self.lookup(path).await?;
        debug!(path = %path, id = %item.id, "Resolved path");
        Ok(item.id)
    }
}
