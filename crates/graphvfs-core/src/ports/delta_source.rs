//! Delta feed port (driven/secondary port)
//!
//! The delta engine consumes changes through [`IDeltaSource`] so it can run
//! against the Graph client in production and a scripted source in tests.
//!
//! ## Design Notes
//!
//! - A call returns one fully materialized page sequence: all `nextLink`
//!   pages have already been followed and concatenated in server order.
//! - An expired cursor is reported as a [`DeltaCursorExpired`] error so the
//!   engine can detect it with `anyhow::Error::downcast_ref`.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{DeltaToken, DriveId, DriveItem};

/// All items returned by one delta page sequence
#[derive(Debug, Clone)]
pub struct DeltaPage {
    /// Changed items in server page order
    pub items: Vec<DriveItem>,
    /// Cursor for the next poll (`None` if the server sent no delta link)
    pub cursor: Option<DeltaToken>,
    /// Server-reported response time of the final page
    pub server_time: DateTime<Utc>,
}

impl DeltaPage {
    /// An empty page carrying only a cursor
    #[must_use]
    pub fn empty(cursor: Option<DeltaToken>, server_time: DateTime<Utc>) -> Self {
        Self {
            items: Vec::new(),
            cursor,
            server_time,
        }
    }
}

/// The delta cursor is no longer valid and a full resync is required
#[derive(Debug, Clone, Error)]
#[error("Delta cursor expired for drive {drive}")]
pub struct DeltaCursorExpired {
    pub drive: DriveId,
}

/// Port trait for the remote change feed
#[async_trait::async_trait]
pub trait IDeltaSource: Send + Sync {
    /// Fetches every change since `cursor`, or the full item set if `None`
    ///
    /// # Errors
    /// - [`DeltaCursorExpired`] (wrapped in `anyhow::Error`) when the server
    ///   rejects the cursor as stale
    /// - Any other remote failure, unchanged
    async fn fetch_delta(
        &self,
        drive: &DriveId,
        cursor: Option<&DeltaToken>,
    ) -> anyhow::Result<DeltaPage>;
}
