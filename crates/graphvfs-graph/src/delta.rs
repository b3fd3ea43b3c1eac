//! Microsoft Graph Delta API
//!
//! A delta query returns every item that changed since a cursor, or the
//! complete item set when no cursor is given.
//!
//! ## Delta Query Flow
//!
//! 1. **Baseline**: `GET /drives/{d}/root/delta` without a cursor
//! 2. **Follow pages**: `@odata.nextLink` pages are fetched and concatenated
//!    in server order
//! 3. **Keep cursor**: the final page's `@odata.deltaLink` becomes the
//!    [`DeltaToken`] for the next round, stored as the complete URL
//! 4. **Incremental**: the next call GETs that URL verbatim
//!
//! A cursor the server no longer accepts is answered with `410 Gone`; the
//! [`IDeltaSource`] adapter reports it as [`DeltaCursorExpired`].

use graphvfs_core::domain::{DeltaToken, DriveId};
use graphvfs_core::ports::{DeltaCursorExpired, DeltaPage, IDeltaSource};
use reqwest::Method;
use tracing::{debug, info};
use url::Url;

use crate::client::{parse_json, server_time, GraphClient};
use crate::model::{GraphDriveItem, GraphPage};
use crate::GraphError;

/// Status Graph uses for an expired delta cursor
const CURSOR_EXPIRED_STATUS: u16 = 410;

impl GraphClient {
    /// Fetches one complete delta page sequence for `drive`
    ///
    /// `server_time` is taken from the `Date` header of the final page.
    pub async fn get_delta(
        &self,
        drive: &DriveId,
        cursor: Option<&DeltaToken>,
    ) -> Result<DeltaPage, GraphError> {
        let mut url = match cursor {
            Some(cursor) => Url::parse(cursor.as_str())?,
            None => self.endpoint(["drives", drive.as_str(), "root", "delta"])?,
        };

        let mut items = Vec::new();
        let mut pages = 0usize;

        loop {
            let response = self.send(self.request(Method::GET, url).await?).await?;
            let time = server_time(&response);
            let page: GraphPage<GraphDriveItem> = parse_json(response).await?;
            pages += 1;

            for raw in page.value {
                items.push(raw.into_domain()?);
            }

            if let Some(next) = page.next_link {
                url = Url::parse(&next)?;
                continue;
            }

            let cursor = page
                .delta_link
                .map(DeltaToken::new)
                .transpose()
                .map_err(|e| GraphError::InvalidResponse(e.to_string()))?;
            if cursor.is_none() {
                debug!(drive = %drive, "Delta response carried no deltaLink");
            }

            debug!(drive = %drive, pages, items = items.len(), "Delta query complete");
            return Ok(DeltaPage {
                items,
                cursor,
                server_time: time,
            });
        }
    }
}

#[async_trait::async_trait]
impl IDeltaSource for GraphClient {
    async fn fetch_delta(
        &self,
        drive: &DriveId,
        cursor: Option<&DeltaToken>,
    ) -> anyhow::Result<DeltaPage> {
        match self.get_delta(drive, cursor).await {
            Ok(page) => Ok(page),
            Err(e) if cursor.is_some() && e.status() == Some(CURSOR_EXPIRED_STATUS) => {
                info!(drive = %drive, "Delta cursor expired");
                Err(DeltaCursorExpired {
                    drive: drive.clone(),
                }
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
