//! Integration tests for delta queries
//!
//! Verifies against a wiremock Graph server:
//! - Baseline query (no cursor) and cursor capture
//! - Incremental query using the delta link verbatim
//! - Pagination across multiple pages
//! - Server time taken from the `Date` header
//! - 410 Gone reported as `DeltaCursorExpired` through the port

use chrono::{TimeZone, Utc};
use graphvfs_core::domain::{DeltaToken, ParentReference};
use graphvfs_core::ports::{DeltaCursorExpired, IDeltaSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, DRIVE};

#[tokio::test]
async fn test_baseline_returns_items_and_cursor() {
    let (server, client) = common::setup_graph_mock().await;

    let items = serde_json::json!([
        { "id": "R", "name": "root", "root": {}, "folder": { "childCount": 1 },
          "parentReference": { "driveId": DRIVE } },
        common::folder_json("F1", "Docs", "R", ""),
        common::file_json("I1", "a.txt", "F1", "/Docs")
    ]);
    common::mount_delta_baseline(&server, items, "t1").await;

    let page = client.get_delta(&common::drive(), None).await.expect("baseline");

    assert_eq!(page.items.len(), 3);
    assert!(page.items[0].is_root);
    assert_eq!(page.items[1].parent.path(), Some(""));
    assert_eq!(page.items[2].parent.path(), Some("Docs"));
    assert_eq!(
        page.cursor.as_ref().map(DeltaToken::as_str),
        Some(common::delta_link(&server, "t1").as_str())
    );
}

#[tokio::test]
async fn test_incremental_uses_cursor_verbatim() {
    let (server, client) = common::setup_graph_mock().await;

    common::mount_delta_round(
        &server,
        "t1",
        serde_json::json!([{ "id": "I1", "deleted": {}, "parentReference": { "id": "F1" } }]),
        "t2",
    )
    .await;

    let cursor = DeltaToken::new(common::delta_link(&server, "t1")).unwrap();
    let page = client
        .get_delta(&common::drive(), Some(&cursor))
        .await
        .expect("incremental");

    assert_eq!(page.items.len(), 1);
    assert!(page.items[0].is_deleted);
    assert!(matches!(page.items[0].parent, ParentReference::IdOnly { .. }));
    assert!(page.cursor.unwrap().as_str().ends_with("token=t2"));
}

#[tokio::test]
async fn test_pages_are_concatenated_in_order() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .and(query_param("token", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::file_json("I1", "a.txt", "R", "")],
            "@odata.nextLink": format!("{}/drives/{DRIVE}/root/delta?token=t1-page2", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .and(query_param("token", "t1-page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                // Mid-sequence entries may only carry the parent id
                { "id": "I2", "name": "b.txt", "file": {}, "parentReference": { "id": "F1" } }
            ],
            "@odata.deltaLink": common::delta_link(&server, "t2")
        })))
        .mount(&server)
        .await;

    let cursor = DeltaToken::new(common::delta_link(&server, "t1")).unwrap();
    let page = client.get_delta(&common::drive(), Some(&cursor)).await.unwrap();

    let ids: Vec<_> = page.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["I1", "I2"]);
    assert!(page.cursor.unwrap().as_str().ends_with("token=t2"));
}

#[tokio::test]
async fn test_server_time_from_date_header() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Date", "Wed, 14 Oct 2026 10:00:00 GMT")
                .set_body_json(serde_json::json!({
                    "value": [],
                    "@odata.deltaLink": common::delta_link(&server, "t1")
                })),
        )
        .mount(&server)
        .await;

    let page = client.get_delta(&common::drive(), None).await.unwrap();
    assert_eq!(page.server_time, Utc.with_ymd_and_hms(2026, 10, 14, 10, 0, 0).unwrap());
}

#[tokio::test]
async fn test_missing_delta_link_yields_no_cursor() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })))
        .mount(&server)
        .await;

    let page = client.get_delta(&common::drive(), None).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.cursor.is_none());
}

#[tokio::test]
async fn test_gone_cursor_reports_expired_through_port() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .and(query_param("token", "stale"))
        .respond_with(ResponseTemplate::new(410).set_body_json(serde_json::json!({
            "error": { "code": "resyncRequired" }
        })))
        .mount(&server)
        .await;

    let cursor = DeltaToken::new(common::delta_link(&server, "stale")).unwrap();

    let direct = client.get_delta(&common::drive(), Some(&cursor)).await.unwrap_err();
    assert_eq!(direct.status(), Some(410));

    let source: &dyn IDeltaSource = &client;
    let err = source
        .fetch_delta(&common::drive(), Some(&cursor))
        .await
        .unwrap_err();
    let expired = err
        .downcast_ref::<DeltaCursorExpired>()
        .expect("expected DeltaCursorExpired");
    assert_eq!(expired.drive.as_str(), DRIVE);
}

#[tokio::test]
async fn test_other_failures_pass_through_port() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/delta")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source: &dyn IDeltaSource = &client;
    let err = source.fetch_delta(&common::drive(), None).await.unwrap_err();
    assert!(err.downcast_ref::<DeltaCursorExpired>().is_none());
    let graph = err
        .downcast_ref::<graphvfs_graph::GraphError>()
        .expect("expected GraphError");
    assert_eq!(graph.status(), Some(503));
}
