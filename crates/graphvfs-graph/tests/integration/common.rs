//! Shared test helpers for Graph API integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server; `setup_graph_mock`
//! returns a GraphClient pointing at that server.

use std::sync::Arc;

use graphvfs_core::domain::{DriveId, VirtualPath};
use graphvfs_graph::client::GraphClient;
use graphvfs_graph::token::StaticTokenSource;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DRIVE: &str = "d1";
pub const TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a client authenticated with [`TOKEN`]
pub async fn setup_graph_mock() -> (MockServer, GraphClient) {
    let server = MockServer::start().await;
    let client = GraphClient::with_base_url(Arc::new(StaticTokenSource::new(TOKEN)), server.uri());
    (server, client)
}

pub fn drive() -> DriveId {
    DriveId::new(DRIVE).unwrap()
}

pub fn vpath(p: &str) -> VirtualPath {
    VirtualPath::parse(drive(), p).unwrap()
}

/// Delta link URL for `token` on the mock server
pub fn delta_link(server: &MockServer, token: &str) -> String {
    format!("{}/drives/{DRIVE}/root/delta?token={token}", server.uri())
}

/// JSON for a file item whose parent has a materialized path
pub fn file_json(id: &str, name: &str, parent_id: &str, parent_path: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "size": 12,
        "createdDateTime": "2026-01-10T08:00:00Z",
        "lastModifiedDateTime": "2026-01-10T08:00:00Z",
        "parentReference": {
            "id": parent_id,
            "driveId": DRIVE,
            "path": format!("/drives/{DRIVE}/root:{parent_path}")
        },
        "file": { "mimeType": "text/plain" }
    })
}

/// JSON for a folder item whose parent has a materialized path
pub fn folder_json(id: &str, name: &str, parent_id: &str, parent_path: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "size": 0,
        "createdDateTime": "2026-01-10T08:00:00Z",
        "lastModifiedDateTime": "2026-01-10T08:00:00Z",
        "parentReference": {
            "id": parent_id,
            "driveId": DRIVE,
            "path": format!("/drives/{DRIVE}/root:{parent_path}")
        },
        "folder": { "childCount": 0 }
    })
}

/// Mounts the cursorless baseline delta answering with `items` and `token`
pub async fn mount_delta_baseline(server: &MockServer, items: serde_json::Value, token: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .and(query_param_is_missing("token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": items,
            "@odata.deltaLink": delta_link(server, token)
        })))
        .mount(server)
        .await;
}

/// Mounts an incremental delta round for cursor `from` that yields `items`
/// and hands out cursor `next`
#[allow(dead_code)]
pub async fn mount_delta_round(
    server: &MockServer,
    from: &str,
    items: serde_json::Value,
    next: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .and(query_param("token", from))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": items,
            "@odata.deltaLink": delta_link(server, next)
        })))
        .mount(server)
        .await;
}
