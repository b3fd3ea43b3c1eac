//! Microsoft Graph resource types (JSON deserialization)
//!
//! These mirror the `drive` and `driveItem` resources closely and are
//! converted into the domain types of `graphvfs-core` at the crate boundary.
//!
//! See: <https://learn.microsoft.com/en-us/graph/api/resources/driveitem>

use chrono::{DateTime, Utc};
use graphvfs_core::domain::{
    ContentHashes, Drive, DriveId, DriveItem, ItemId, ItemKind, ParentReference,
};
use serde::Deserialize;

use crate::GraphError;

// ============================================================================
// Collections
// ============================================================================

/// One page of a Graph collection
#[derive(Debug, Deserialize)]
pub struct GraphPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,

    /// URL of the next page (present when more pages exist)
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,

    /// Cursor URL for the next delta round (last delta page only)
    #[serde(rename = "@odata.deltaLink")]
    pub delta_link: Option<String>,
}

// ============================================================================
// drive
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDrive {
    pub id: String,
    pub name: Option<String>,
    pub drive_type: Option<String>,
    pub owner: Option<GraphIdentitySet>,
}

#[derive(Debug, Deserialize)]
pub struct GraphIdentitySet {
    pub user: Option<GraphIdentity>,
    pub group: Option<GraphIdentity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphIdentity {
    pub display_name: Option<String>,
}

impl GraphDrive {
    /// Converts into the domain [`Drive`]
    pub fn into_domain(self) -> Result<Drive, GraphError> {
        let id = DriveId::new(self.id).map_err(|e| GraphError::InvalidResponse(e.to_string()))?;
        let owner = self.owner.and_then(|o| {
            o.user
                .or(o.group)
                .and_then(|identity| identity.display_name)
        });

        Ok(Drive {
            name: self.name.unwrap_or_else(|| id.to_string()),
            id,
            drive_type: self.drive_type.unwrap_or_default(),
            owner,
        })
    }
}

// ============================================================================
// driveItem
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDriveItem {
    pub id: String,

    /// Tombstones in a delta feed may omit the name
    #[serde(default)]
    pub name: String,

    pub size: Option<u64>,
    pub created_date_time: Option<DateTime<Utc>>,
    pub last_modified_date_time: Option<DateTime<Utc>>,
    pub parent_reference: Option<GraphParentReference>,
    pub file: Option<GraphFileFacet>,
    pub folder: Option<GraphFolderFacet>,

    /// Present (as `{}`) only on the drive's root folder
    pub root: Option<serde_json::Value>,

    /// Present on delta tombstones
    pub deleted: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphParentReference {
    pub id: Option<String>,
    pub drive_id: Option<String>,

    /// Parent location, e.g. `/drive/root:` or `/drives/{id}/root:/Docs`
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFileFacet {
    pub mime_type: Option<String>,
    pub hashes: Option<GraphHashes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphHashes {
    pub quick_xor_hash: Option<String>,
    pub sha1_hash: Option<String>,
    pub sha256_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFolderFacet {
    pub child_count: Option<u64>,
}

impl GraphDriveItem {
    /// Converts into the domain [`DriveItem`]
    ///
    /// # Errors
    /// Returns `GraphError::InvalidResponse` if the item or parent id is not
    /// a valid identifier
    pub fn into_domain(self) -> Result<DriveItem, GraphError> {
        let id = ItemId::new(self.id).map_err(|e| GraphError::InvalidResponse(e.to_string()))?;
        let is_root = self.root.is_some();

        let kind = if self.folder.is_some() || is_root {
            ItemKind::Folder
        } else {
            ItemKind::File
        };

        let parent = match self.parent_reference {
            Some(_) if is_root => ParentReference::Root,
            Some(reference) => {
                let parent_id = reference
                    .id
                    .filter(|id| !id.is_empty())
                    .map(ItemId::new)
                    .transpose()
                    .map_err(|e| GraphError::InvalidResponse(e.to_string()))?;
                let path = reference.path.as_deref().map(normalize_parent_path);
                ParentReference::from_parts(path, parent_id)
            }
            None => ParentReference::Root,
        };

        let (hashes, mime_type) = match self.file {
            Some(file) => {
                let hashes = file
                    .hashes
                    .map(|h| ContentHashes {
                        quick_xor: h.quick_xor_hash,
                        sha1: h.sha1_hash,
                        sha256: h.sha256_hash,
                    })
                    .unwrap_or_default();
                (hashes, file.mime_type)
            }
            None => (ContentHashes::default(), None),
        };

        Ok(DriveItem {
            id,
            name: self.name,
            size: self.size.unwrap_or(0),
            created_at: self.created_date_time,
            modified_at: self.last_modified_date_time,
            kind,
            parent,
            is_root,
            is_deleted: self.deleted.is_some(),
            hashes,
            mime_type,
        })
    }
}

/// Strips the Graph drive prefix from a parent path
///
/// `/drive/root:` and `/drives/{id}/root:` both denote the drive root and
/// become `""`; `/drive/root:/Docs/Reports` becomes `Docs/Reports`.
#[must_use]
pub fn normalize_parent_path(raw: &str) -> String {
    const ROOT_MARKER: &str = "root:";

    let rest = match raw.find(ROOT_MARKER) {
        Some(idx) => &raw[idx + ROOT_MARKER.len()..],
        None => raw,
    };
    rest.trim_matches('/').to_string()
}
