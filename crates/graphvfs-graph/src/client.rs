//! Microsoft Graph API client
//!
//! Provides the authenticated HTTP plumbing shared by the item and delta
//! operations: URL construction, bearer-token injection, status checking,
//! JSON decoding and `@odata.nextLink` paging.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use graphvfs_graph::client::GraphClient;
//! use graphvfs_graph::token::StaticTokenSource;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = GraphClient::new(Arc::new(StaticTokenSource::new("access-token")));
//! for drive in client.list_drives().await? {
//!     println!("{} {}", drive.id, drive.name);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use graphvfs_core::config::{GraphConfig, DEFAULT_GRAPH_BASE_URL};
use graphvfs_core::domain::VirtualPath;
use graphvfs_core::ports::ITokenSource;
use reqwest::header::DATE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::model::GraphPage;
use crate::GraphError;

// ============================================================================
// GraphClient
// ============================================================================

/// HTTP client for Microsoft Graph drive calls
///
/// The bearer token is requested from the [`ITokenSource`] on first use and
/// cached until [`GraphClient::renew_access_token`] is called. The slot is
/// guarded by an async mutex, so concurrent first calls still hit the source
/// exactly once.
pub struct GraphClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL every endpoint path is appended to
    base_url: String,
    /// Where bearer tokens come from
    token_source: Arc<dyn ITokenSource>,
    /// Cached bearer token
    access_token: Mutex<Option<String>>,
}

impl GraphClient {
    /// Creates a client against the public Graph v1.0 endpoint
    pub fn new(token_source: Arc<dyn ITokenSource>) -> Self {
        Self::with_base_url(token_source, DEFAULT_GRAPH_BASE_URL)
    }

    /// Creates a client with a custom base URL (useful for testing)
    pub fn with_base_url(token_source: Arc<dyn ITokenSource>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token_source,
            access_token: Mutex::new(None),
        }
    }

    /// Creates a client from the `graph` configuration section
    ///
    /// # Errors
    /// Returns `GraphError::Network` if the HTTP client cannot be built
    pub fn from_config(
        config: &GraphConfig,
        token_source: Arc<dyn ITokenSource>,
    ) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token_source,
            access_token: Mutex::new(None),
        })
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the cached bearer token, asking the token source on first use
    ///
    /// # Errors
    /// Returns `GraphError::TokenUnavailable` if the source fails
    pub async fn access_token(&self) -> Result<String, GraphError> {
        let mut slot = self.access_token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let token = self
            .token_source
            .access_token()
            .await
            .map_err(|e| GraphError::TokenUnavailable(format!("{e:#}")))?;
        debug!("Obtained access token from token source");
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token so the next request asks the source again
    pub async fn renew_access_token(&self) {
        *self.access_token.lock().await = None;
        debug!("Cleared cached access token");
    }

    // ========================================================================
    // URL construction
    // ========================================================================

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment
    pub(crate) fn endpoint<I>(&self, segments: I) -> Result<Url, GraphError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|()| GraphError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds the path-addressed URL of an item
    ///
    /// Uses Graph's colon syntax: `/drives/{d}/root:/Docs/a.txt` for the item
    /// itself, `/drives/{d}/root:/Docs/a.txt:/content` with a suffix. The
    /// drive root is addressed as `/drives/{d}/root[/suffix]`.
    pub(crate) fn item_endpoint(
        &self,
        path: &VirtualPath,
        suffix: Option<&str>,
    ) -> Result<Url, GraphError> {
        let mut segments = vec!["drives".to_string(), path.drive_id().to_string()];

        if path.is_root() {
            segments.push("root".to_string());
        } else {
            segments.push("root:".to_string());
            segments.extend(path.segments().iter().cloned());
            if suffix.is_some() {
                if let Some(last) = segments.last_mut() {
                    last.push(':');
                }
            }
        }

        if let Some(suffix) = suffix {
            segments.push(suffix.to_string());
        }

        self.endpoint(segments)
    }

    // ========================================================================
    // Request execution
    // ========================================================================

    /// Creates an authenticated request builder for `url`
    pub(crate) async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, GraphError> {
        let token = self.access_token().await?;
        debug!(method = %method, url = %url, "Graph request");
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    /// Sends a request and converts non-2xx answers into `RequestFailed`
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, GraphError> {
        let response = request.send().await?;
        check_status(response).await
    }

    /// GET `url` and decode the JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GraphError> {
        let response = self.send(self.request(Method::GET, url).await?).await?;
        parse_json(response).await
    }

    /// GET a collection, following `@odata.nextLink` until exhausted
    pub(crate) async fn get_all_pages<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, GraphError> {
        let mut items = Vec::new();
        let mut next = Some(url);
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let page: GraphPage<T> = self.get_json(url).await?;
            pages += 1;
            items.extend(page.value);
            next = page.next_link.as_deref().map(Url::parse).transpose()?;
        }

        debug!(pages, items = items.len(), "Fetched paged collection");
        Ok(items)
    }
}

/// Fails with `RequestFailed` unless the response status is 2xx
pub(crate) async fn check_status(response: Response) -> Result<Response, GraphError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), url = %url, "Graph request failed");
    Err(GraphError::RequestFailed {
        status: status.as_u16(),
        body,
        url,
    })
}

/// Decodes a JSON body, reporting malformed payloads as `InvalidResponse`
pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, GraphError> {
    let url = response.url().to_string();
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| GraphError::InvalidResponse(format!("Failed to parse response from {url}: {e}")))
}

/// Server time from the HTTP `Date` header, falling back to the local clock
pub(crate) fn server_time(response: &Response) -> DateTime<Utc> {
    response
        .headers()
        .get(DATE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}
