//! Change subscriptions as filesystem events
//!
//! A [`VfsWatch`] wraps one [`WatchHandle`] and turns the engine's
//! root-relative paths back into URIs on the watched drive.

use graphvfs_core::domain::{ChangeType, VirtualPath};
use graphvfs_sync::{EngineState, WatchHandle};
use tokio::sync::watch;
use tracing::warn;

/// Options a host passes when watching
///
/// Watches always cover the whole drive; both fields are accepted for
/// interface compatibility and otherwise ignored.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub recursive: bool,
    pub excludes: Vec<String>,
}

/// One change, addressed by URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub change_type: ChangeType,
    pub uri: VirtualPath,
}

/// A live subscription; dropping it releases the drive's watch session
pub struct VfsWatch {
    handle: WatchHandle,
}

impl VfsWatch {
    pub(crate) fn new(handle: WatchHandle) -> Self {
        Self { handle }
    }

    /// Waits for the next round of changes
    ///
    /// Returns `None` once the subscription's engine has stopped.
    pub async fn next_events(&mut self) -> Option<Vec<FileChangeEvent>> {
        let batch = self.handle.next_batch().await?;
        let drive = self.handle.drive();

        let events = batch
            .iter()
            .filter_map(|event| match VirtualPath::parse(drive.clone(), &event.path) {
                Ok(uri) => Some(FileChangeEvent {
                    change_type: event.change_type,
                    uri,
                }),
                Err(e) => {
                    warn!(drive = %drive, path = %event.path, error = %e, "Dropping change with unusable path");
                    None
                }
            })
            .collect();
        Some(events)
    }

    /// Observer of the engine behind this subscription
    pub fn engine_state(&self) -> watch::Receiver<EngineState> {
        self.handle.engine_state()
    }

    /// Releases the subscription
    pub fn dispose(self) {
        self.handle.release();
    }
}
