//! Virtual paths
//!
//! A [`VirtualPath`] is the user-facing address of an item: a drive id plus a
//! list of name segments. It is a derived lookup key, never a cached identity;
//! the same path may name different items over time.
//!
//! The textual form is a URI whose authority is the drive id:
//!
//! ```text
//! onedrive://b!t18F8ybsHUq1z3LT/Docs/a.txt
//! ```

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::DriveId;

/// URI scheme handled by this filesystem
pub const URI_SCHEME: &str = "onedrive";

/// A tokenized path `(drive, segments)`; no segments means the drive root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualPath {
    drive_id: DriveId,
    segments: Vec<String>,
}

impl VirtualPath {
    /// Creates a path from already-split segments
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if a segment is empty, contains a
    /// `/`, or is a `.`/`..` traversal component
    pub fn new(drive_id: DriveId, segments: Vec<String>) -> Result<Self, DomainError> {
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self { drive_id, segments })
    }

    /// The root of a drive
    #[must_use]
    pub fn root(drive_id: DriveId) -> Self {
        Self {
            drive_id,
            segments: Vec::new(),
        }
    }

    /// Parses a `/`-separated path relative to the drive root
    ///
    /// Leading, trailing, and repeated slashes are ignored, so `"/Docs/"`,
    /// `"Docs"` and `"//Docs"` name the same folder.
    pub fn parse(drive_id: DriveId, path: &str) -> Result<Self, DomainError> {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(drive_id, segments)
    }

    /// Parses a `onedrive://<drive>/<path>` URI
    ///
    /// # Errors
    /// - `DomainError::UnsupportedScheme` if the URI uses another scheme
    /// - `DomainError::InvalidDriveId` if the authority is empty or malformed
    /// - `DomainError::InvalidPath` for malformed segments
    pub fn from_uri(uri: &str) -> Result<Self, DomainError> {
        let rest = uri
            .strip_prefix(URI_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(|| DomainError::UnsupportedScheme(uri.to_string()))?;

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };

        let drive_id = DriveId::new(authority)?;
        Self::parse(drive_id, path)
    }

    #[must_use]
    pub fn drive_id(&self) -> &DriveId {
        &self.drive_id
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, `None` for the drive root
    #[must_use]
    pub fn basename(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Containing folder, `None` for the drive root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            drive_id: self.drive_id.clone(),
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Appends one segment
    pub fn join(&self, name: &str) -> Result<Self, DomainError> {
        validate_segment(name)?;
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self {
            drive_id: self.drive_id.clone(),
            segments,
        })
    }

    /// Root-relative path without a leading slash (`""` for the root)
    #[must_use]
    pub fn relative_path(&self) -> String {
        self.segments.join("/")
    }

    /// The `onedrive://` URI form
    #[must_use]
    pub fn to_uri(&self) -> String {
        format!("{URI_SCHEME}://{}/{}", self.drive_id, self.relative_path())
    }
}

impl Display for VirtualPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// Joins a root-relative parent path and a child name
///
/// An empty parent denotes the drive root, so the result never starts with `/`.
#[must_use]
pub fn join_relative(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn validate_segment(segment: &str) -> Result<(), DomainError> {
    if segment.is_empty() || segment.contains('/') || segment == "." || segment == ".." {
        return Err(DomainError::InvalidPath(format!(
            "Invalid path segment: {segment:?}"
        )));
    }
    Ok(())
}
