//! Drive and drive item entities
//!
//! A [`DriveItem`] is the remote entity behind every file and folder. Items are
//! keyed by their [`ItemId`], which survives renames and moves; only `name` and
//! `parent` change when an item is relocated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{DriveId, ItemId};

// ============================================================================
// Drive
// ============================================================================

/// A cloud storage container with its own root and item namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    pub id: DriveId,
    pub name: String,
    /// `personal`, `business` or `documentLibrary`
    pub drive_type: String,
    /// Display name of the owning user or group, when reported
    pub owner: Option<String>,
}

// ============================================================================
// ParentReference
// ============================================================================

/// Pointer from an item to its containing folder
///
/// Exactly one state holds per item snapshot:
/// - the server materialized the parent's path (relative to the drive root,
///   `""` meaning the root folder itself),
/// - only the parent's id is known, which happens for items returned in the
///   middle of a delta page sequence,
/// - the item has no parent because it is the drive root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ParentReference {
    /// Materialized root-relative parent path, plus the parent id when reported
    Path { path: String, id: Option<ItemId> },
    /// Parent id without a path
    IdOnly { id: ItemId },
    /// No parent (drive root)
    Root,
}

impl ParentReference {
    /// Builds a reference from the optional parts reported by the server
    ///
    /// A path always wins over a bare id.
    #[must_use]
    pub fn from_parts(path: Option<String>, id: Option<ItemId>) -> Self {
        match (path, id) {
            (Some(path), id) => Self::Path { path, id },
            (None, Some(id)) => Self::IdOnly { id },
            (None, None) => Self::Root,
        }
    }

    /// The materialized parent path, if the server supplied one
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Path { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The parent item id, if known
    #[must_use]
    pub fn id(&self) -> Option<&ItemId> {
        match self {
            Self::Path { id, .. } => id.as_ref(),
            Self::IdOnly { id } => Some(id),
            Self::Root => None,
        }
    }
}

// ============================================================================
// DriveItem
// ============================================================================

/// Whether an item is a folder or a file (mutually exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Folder,
}

/// Content hashes reported for files (opaque, never verified locally)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHashes {
    pub quick_xor: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

impl ContentHashes {
    /// Returns true if no hash was reported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quick_xor.is_none() && self.sha1.is_none() && self.sha256.is_none()
    }
}

/// A file or folder on a remote drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveItem {
    /// Stable identifier, unique within the drive
    pub id: ItemId,
    pub name: String,
    /// Size in bytes (folders report the total size of their contents)
    pub size: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub kind: ItemKind,
    pub parent: ParentReference,
    /// True for the drive's root folder
    pub is_root: bool,
    /// Tombstone flag set on delta entries for removed items
    pub is_deleted: bool,
    pub hashes: ContentHashes,
    pub mime_type: Option<String>,
}

impl DriveItem {
    /// Creates a file item whose parent is the drive root
    #[must_use]
    pub fn file(id: ItemId, name: impl Into<String>) -> Self {
        Self::new(id, name, ItemKind::File)
    }

    /// Creates a folder item whose parent is the drive root
    #[must_use]
    pub fn folder(id: ItemId, name: impl Into<String>) -> Self {
        Self::new(id, name, ItemKind::Folder)
    }

    /// Creates the root folder item of a drive
    #[must_use]
    pub fn root(id: ItemId) -> Self {
        let mut item = Self::new(id, "root", ItemKind::Folder);
        item.parent = ParentReference::Root;
        item.is_root = true;
        item
    }

    fn new(id: ItemId, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id,
            name: name.into(),
            size: 0,
            created_at: None,
            modified_at: None,
            kind,
            parent: ParentReference::Path {
                path: String::new(),
                id: None,
            },
            is_root: false,
            is_deleted: false,
            hashes: ContentHashes::default(),
            mime_type: None,
        }
    }

    /// Replaces the parent reference
    #[must_use]
    pub fn with_parent(mut self, parent: ParentReference) -> Self {
        self.parent = parent;
        self
    }

    /// Sets the creation timestamp
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the size in bytes
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Marks the item as a deletion tombstone
    #[must_use]
    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }
}
