//! Domain entities and value types
//!
//! This module contains the core domain types for GraphVFS:
//! - Newtypes for drive, item, session identifiers and delta cursors
//! - Drive items and their parent references
//! - Virtual paths addressed by drive and segments
//! - Change events emitted by the delta engine
//! - Domain-specific error types

pub mod change;
pub mod errors;
pub mod item;
pub mod newtypes;
pub mod path;

// Re-export commonly used types
pub use change::{ChangeBatch, ChangeEvent, ChangeType};
pub use errors::DomainError;
pub use item::{ContentHashes, Drive, DriveItem, ItemKind, ParentReference};
pub use newtypes::*;
pub use path::{join_relative, VirtualPath, URI_SCHEME};
