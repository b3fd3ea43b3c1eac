//! Path-addressed filesystem operations over Graph drives
//!
//! Read-side operations (stat, read, write, delete) go straight to the
//! path-addressed Graph endpoints. Operations whose Graph counterpart takes
//! ids (list, createDirectory, rename, copy) resolve them first through the
//! [`PathResolver`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use graphvfs_core::config::WatchConfig;
use graphvfs_core::domain::{DriveItem, VirtualPath};
use graphvfs_graph::GraphClient;
use graphvfs_sync::WatchRegistry;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::VfsError;
use crate::mime::guess_mime_type;
use crate::resolver::PathResolver;
use crate::watch::{VfsWatch, WatchOptions};

// ============================================================================
// Result types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
}

/// Metadata returned by [`GraphFileSystem::stat`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub kind: FileType,
    pub size: u64,
    pub ctime: Option<DateTime<Utc>>,
    pub mtime: Option<DateTime<Utc>>,
}

/// One directory listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileType,
}

impl From<&DriveItem> for FileType {
    fn from(item: &DriveItem) -> Self {
        if item.is_folder() {
            FileType::Directory
        } else {
            FileType::File
        }
    }
}

impl From<&DriveItem> for FileStat {
    fn from(item: &DriveItem) -> Self {
        Self {
            kind: item.into(),
            size: item.size,
            ctime: item.created_at,
            mtime: item.modified_at,
        }
    }
}

// ============================================================================
// GraphFileSystem
// ============================================================================

/// Filesystem adapter for `onedrive://` URIs
pub struct GraphFileSystem {
    client: Arc<GraphClient>,
    resolver: PathResolver,
    watches: WatchRegistry,
}

impl GraphFileSystem {
    /// Creates an adapter whose watches poll every `poll_interval`
    pub fn new(client: Arc<GraphClient>, poll_interval: Duration) -> Self {
        let watches = WatchRegistry::new(client.clone(), poll_interval);
        Self {
            resolver: PathResolver::new(client.clone()),
            client,
            watches,
        }
    }

    /// Creates an adapter from the `watch` configuration section
    pub fn from_config(client: Arc<GraphClient>, config: &WatchConfig) -> Self {
        let watches = WatchRegistry::new(client.clone(), config.poll_interval())
            .with_event_buffer(config.event_buffer);
        Self {
            resolver: PathResolver::new(client.clone()),
            client,
            watches,
        }
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    /// The watch registry shared by every [`GraphFileSystem::watch`] call
    pub fn watches(&self) -> &WatchRegistry {
        &self.watches
    }

    /// Parses a host URI
    pub fn parse_uri(uri: &str) -> Result<VirtualPath, VfsError> {
        Ok(VirtualPath::from_uri(uri)?)
    }

    // ========================================================================
    // Read-side operations
    // ========================================================================

    pub async fn stat(&self, uri: &str) -> Result<FileStat, VfsError> {
        let path = Self::parse_uri(uri)?;
        let item = self.resolver.lookup(&path).await?;
        Ok(FileStat::from(&item))
    }

    /// Lists a directory's immediate children
    pub async fn list(&self, uri: &str) -> Result<Vec<DirEntry>, VfsError> {
        let path = Self::parse_uri(uri)?;
        let id = self.resolver.resolve(&path).await?;
        let children = self
            .client
            .list_children(path.drive_id(), &id)
            .await
            .map_err(|e| VfsError::from_remote(&path, e))?;

        Ok(children
            .iter()
            .map(|child| DirEntry {
                name: child.name.clone(),
                kind: child.into(),
            })
            .collect())
    }

    pub async fn read(&self, uri: &str) -> Result<Vec<u8>, VfsError> {
        let path = Self::parse_uri(uri)?;
        self.client
            .download_by_path(&path)
            .await
            .map_err(|e| VfsError::from_remote(&path, e))
    }

    // ========================================================================
    // Mutating operations
    // ========================================================================

    /// Creates or fully replaces a file
    pub async fn write(&self, uri: &str, content: Vec<u8>) -> Result<(), VfsError> {
        let path = Self::parse_uri(uri)?;
        let name = path
            .basename()
            .ok_or_else(|| VfsError::InvalidArgument(format!("cannot write to drive root {path}")))?;
        let mime = guess_mime_type(name);

        self.client
            .upload_by_path(&path, content, mime)
            .await
            .map_err(|e| VfsError::from_remote(&path, e))?;
        debug!(uri = %path, mime = mime.unwrap_or("-"), "Wrote file");
        Ok(())
    }

    /// Creates a folder; an existing name is resolved server-side by renaming
    pub async fn create_directory(&self, uri: &str) -> Result<(), VfsError> {
        let path = Self::parse_uri(uri)?;
        let (parent, name) = split_parent(&path)?;

        let parent_id = self.resolver.resolve(&parent).await?;
        let folder = self
            .client
            .create_folder(path.drive_id(), &parent_id, name)
            .await
            .map_err(|e| VfsError::from_remote(&parent, e))?;

        if folder.name != name {
            info!(uri = %path, created = %folder.name, "Folder name taken, server renamed it");
        }
        Ok(())
    }

    /// Deletes an item; deleting something that does not exist succeeds
    pub async fn delete(&self, uri: &str) -> Result<(), VfsError> {
        let path = Self::parse_uri(uri)?;
        if path.is_root() {
            return Err(VfsError::InvalidArgument(format!("cannot delete drive root {path}")));
        }

        // The client already treats an absent item as deleted
        self.client.delete_by_path(&path).await?;
        Ok(())
    }

    /// Moves and/or renames an item with a single remote call
    pub async fn rename(&self, old_uri: &str, new_uri: &str) -> Result<(), VfsError> {
        let (source, target_parent, target_name) = self.transfer_paths(old_uri, new_uri)?;

        let (id, parent_id) = tokio::try_join!(
            self.resolver.resolve(&source),
            self.resolver.resolve(&target_parent)
        )?;

        self.client
            .move_item(source.drive_id(), &id, &parent_id, &target_name)
            .await
            .map_err(|e| VfsError::from_remote(&source, e))?;
        debug!(from = %source, to = %new_uri, "Renamed item");
        Ok(())
    }

    /// Copies an item; the server accepting the copy counts as done
    pub async fn copy(&self, source_uri: &str, target_uri: &str) -> Result<(), VfsError> {
        let (source, target_parent, target_name) = self.transfer_paths(source_uri, target_uri)?;

        let (id, parent_id) = tokio::try_join!(
            self.resolver.resolve(&source),
            self.resolver.resolve(&target_parent)
        )?;

        self.client
            .copy_item(source.drive_id(), &id, &parent_id, &target_name)
            .await
            .map_err(|e| VfsError::from_remote(&source, e))?;
        debug!(from = %source, to = %target_uri, "Copied item");
        Ok(())
    }

    /// Parses the URIs of a rename/copy into (source, target parent, target name)
    fn transfer_paths(
        &self,
        source_uri: &str,
        target_uri: &str,
    ) -> Result<(VirtualPath, VirtualPath, String), VfsError> {
        let source = Self::parse_uri(source_uri)?;
        let target = Self::parse_uri(target_uri)?;

        if source.is_root() {
            return Err(VfsError::InvalidArgument(format!("cannot move drive root {source}")));
        }
        if source.drive_id() != target.drive_id() {
            return Err(VfsError::InvalidArgument(format!(
                "source {source} and target {target} are on different drives"
            )));
        }

        let (parent, name) = split_parent(&target)?;
        let name = name.to_string();
        Ok((source, parent, name))
    }

    // ========================================================================
    // Watching
    // ========================================================================

    /// Subscribes to changes anywhere on the URI's drive
    ///
    /// `options` are ignored: every watch covers the whole drive, and all
    /// watches of one drive share a single polling engine.
    pub fn watch(&self, uri: &str, options: WatchOptions) -> Result<VfsWatch, VfsError> {
        let path = Self::parse_uri(uri)?;
        debug!(uri = %path, recursive = options.recursive, "Watch requested");
        let handle = self.watches.subscribe(path.drive_id());
        Ok(VfsWatch::new(handle))
    }
}

/// Splits a non-root path into its parent and basename
fn split_parent(path: &VirtualPath) -> Result<(VirtualPath, &str), VfsError> {
    match (path.parent(), path.basename()) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(VfsError::InvalidArgument(format!(
            "{path} is a drive root and has no parent"
        ))),
    }
}
