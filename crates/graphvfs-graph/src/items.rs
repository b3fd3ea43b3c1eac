//! Drive and item operations
//!
//! Read-side calls are path-addressed (`/drives/{d}/root:/path`), while
//! folder creation, move and copy take item ids, since those are the
//! identities Graph keeps stable across renames.

use graphvfs_core::domain::{Drive, DriveId, DriveItem, ItemId, VirtualPath};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use crate::client::{parse_json, GraphClient};
use crate::model::{GraphDrive, GraphDriveItem};
use crate::GraphError;

/// Content type used when the caller does not supply one
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Server-side collision policy for created folders
const CONFLICT_BEHAVIOR: &str = "rename";

fn into_domain_items(raw: Vec<GraphDriveItem>) -> Result<Vec<DriveItem>, GraphError> {
    raw.into_iter().map(GraphDriveItem::into_domain).collect()
}

impl GraphClient {
    // ========================================================================
    // Discovery
    // ========================================================================

    /// Lists the drives available to the signed-in user (`GET /me/drives`)
    pub async fn list_drives(&self) -> Result<Vec<Drive>, GraphError> {
        let url = self.endpoint(["me", "drives"])?;
        let drives: Vec<GraphDrive> = self.get_all_pages(url).await?;
        debug!(count = drives.len(), "Listed drives");
        drives.into_iter().map(GraphDrive::into_domain).collect()
    }

    /// Lists the children of a drive's root folder
    pub async fn list_root_children(&self, drive: &DriveId) -> Result<Vec<DriveItem>, GraphError> {
        let url = self.endpoint(["drives", drive.as_str(), "root", "children"])?;
        into_domain_items(self.get_all_pages(url).await?)
    }

    /// Lists the children of a folder by id
    pub async fn list_children(
        &self,
        drive: &DriveId,
        id: &ItemId,
    ) -> Result<Vec<DriveItem>, GraphError> {
        let url = self.endpoint(["drives", drive.as_str(), "items", id.as_str(), "children"])?;
        let children = into_domain_items(self.get_all_pages(url).await?)?;
        debug!(drive = %drive, id = %id, count = children.len(), "Listed children");
        Ok(children)
    }

    // ========================================================================
    // Path-addressed operations
    // ========================================================================

    /// Fetches item metadata by path
    pub async fn get_item_by_path(&self, path: &VirtualPath) -> Result<DriveItem, GraphError> {
        let url = self.item_endpoint(path, None)?;
        let raw: GraphDriveItem = self.get_json(url).await?;
        raw.into_domain()
    }

    /// Downloads file content by path
    ///
    /// Graph answers with a redirect to a pre-authenticated download URL,
    /// which reqwest follows.
    pub async fn download_by_path(&self, path: &VirtualPath) -> Result<Vec<u8>, GraphError> {
        let url = self.item_endpoint(path, Some("content"))?;
        let response = self.send(self.request(Method::GET, url).await?).await?;
        let bytes = response.bytes().await?;
        debug!(path = %path, bytes = bytes.len(), "Downloaded file");
        Ok(bytes.to_vec())
    }

    /// Uploads file content by path, creating or fully replacing the file
    pub async fn upload_by_path(
        &self,
        path: &VirtualPath,
        data: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<DriveItem, GraphError> {
        let url = self.item_endpoint(path, Some("content"))?;
        let size = data.len();
        let request = self
            .request(Method::PUT, url)
            .await?
            .header(CONTENT_TYPE, mime_type.unwrap_or(DEFAULT_CONTENT_TYPE))
            .body(data);

        let response = self.send(request).await?;
        let raw: GraphDriveItem = parse_json(response).await?;
        debug!(path = %path, bytes = size, "Uploaded file");
        raw.into_domain()
    }

    /// Deletes an item by path; an item that is already gone is not an error
    pub async fn delete_by_path(&self, path: &VirtualPath) -> Result<(), GraphError> {
        let url = self.item_endpoint(path, None)?;
        match self.send(self.request(Method::DELETE, url).await?).await {
            Ok(_) => {
                debug!(path = %path, "Deleted item");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path, "Item already absent, nothing to delete");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Id-addressed operations
    // ========================================================================

    /// Creates a folder under `parent`; a name collision is resolved by the
    /// server picking a new name
    pub async fn create_folder(
        &self,
        drive: &DriveId,
        parent: &ItemId,
        name: &str,
    ) -> Result<DriveItem, GraphError> {
        let url = self.endpoint(["drives", drive.as_str(), "items", parent.as_str(), "children"])?;
        let body = json!({
            "name": name,
            "folder": {},
            "@microsoft.graph.conflictBehavior": CONFLICT_BEHAVIOR,
        });

        let response = self
            .send(self.request(Method::POST, url).await?.json(&body))
            .await?;
        let raw: GraphDriveItem = parse_json(response).await?;
        let folder = raw.into_domain()?;
        debug!(drive = %drive, parent = %parent, name = %folder.name, "Created folder");
        Ok(folder)
    }

    /// Moves and/or renames an item in one call
    pub async fn move_item(
        &self,
        drive: &DriveId,
        id: &ItemId,
        new_parent: &ItemId,
        new_name: &str,
    ) -> Result<DriveItem, GraphError> {
        let url = self.endpoint(["drives", drive.as_str(), "items", id.as_str()])?;
        let body = json!({
            "parentReference": { "id": new_parent.as_str() },
            "name": new_name,
        });

        let response = self
            .send(self.request(Method::PATCH, url).await?.json(&body))
            .await?;
        let raw: GraphDriveItem = parse_json(response).await?;
        debug!(drive = %drive, id = %id, parent = %new_parent, name = new_name, "Moved item");
        raw.into_domain()
    }

    /// Starts a server-side copy
    ///
    /// Graph accepts the copy with `202 Accepted` and finishes it
    /// asynchronously; acceptance is treated as completion.
    pub async fn copy_item(
        &self,
        drive: &DriveId,
        id: &ItemId,
        new_parent: &ItemId,
        new_name: &str,
    ) -> Result<(), GraphError> {
        let url = self.endpoint(["drives", drive.as_str(), "items", id.as_str(), "copy"])?;
        let body = json!({
            "parentReference": { "driveId": drive.as_str(), "id": new_parent.as_str() },
            "name": new_name,
        });

        let response = self
            .send(self.request(Method::POST, url).await?.json(&body))
            .await?;
        let monitor = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");
        debug!(drive = %drive, id = %id, parent = %new_parent, monitor, "Copy accepted");
        Ok(())
    }
}
