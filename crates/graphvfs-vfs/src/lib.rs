//! GraphVFS VFS - filesystem semantics over remote Graph drives
//!
//! Hosts address items with `onedrive://<drive>/<path>` URIs and get
//! filesystem-style results: stat records, directory listings, byte buffers,
//! not-found errors and change notifications.
//!
//! ## Modules
//!
//! - [`error`] - [`VfsError`] and its mapping from remote failures
//! - [`resolver`] - Virtual path to item id resolution
//! - [`provider`] - The [`GraphFileSystem`] operations
//! - [`watch`] - Change subscriptions exposed as filesystem events
//! - [`mime`] - Content type guessing for uploads

pub mod error;
pub mod mime;
pub mod provider;
pub mod resolver;
pub mod watch;

pub use error::VfsError;
pub use provider::{DirEntry, FileStat, FileType, GraphFileSystem};
pub use watch::{FileChangeEvent, VfsWatch, WatchOptions};
