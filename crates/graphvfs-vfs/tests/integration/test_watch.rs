//! Integration tests for delta-driven watches

use std::time::Duration;

use graphvfs_core::domain::ChangeType;
use graphvfs_sync::EngineState;
use graphvfs_vfs::WatchOptions;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, DRIVE};

fn delta_path() -> String {
    format!("/drives/{DRIVE}/root/delta")
}

fn delta_link(server: &MockServer, token: &str) -> String {
    format!("{}/drives/{DRIVE}/root/delta?token={token}", server.uri())
}

/// Baseline: root, Docs (F1), Docs/a.txt (I1), cursor t1
async fn mount_baseline(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(delta_path()))
        .and(query_param_is_missing("token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                common::root_json(),
                common::folder_json("F1", "Docs", ""),
                common::file_json("I1", "a.txt", "/Docs")
            ],
            "@odata.deltaLink": delta_link(server, "t1")
        })))
        .mount(server)
        .await;
}

async fn mount_round(server: &MockServer, from: &str, items: serde_json::Value, next: &str) {
    Mock::given(method("GET"))
        .and(path(delta_path()))
        .and(query_param("token", from))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": items,
            "@odata.deltaLink": delta_link(server, next)
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_remote_delete_yields_exactly_one_event() {
    let (server, fs) = common::setup_fs().await;
    mount_baseline(&server).await;
    mount_round(&server, "t1", serde_json::json!([]), "t2").await;
    mount_round(
        &server,
        "t2",
        serde_json::json!([{ "id": "I1", "deleted": { "state": "deleted" }, "parentReference": { "id": "F1" } }]),
        "t3",
    )
    .await;
    mount_round(&server, "t3", serde_json::json!([]), "t3").await;

    let mut watch = fs
        .watch(&common::uri("/"), WatchOptions::default())
        .expect("watch");

    let events = tokio::time::timeout(Duration::from_secs(5), watch.next_events())
        .await
        .expect("timed out waiting for events")
        .expect("watch ended");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change_type, ChangeType::Deleted);
    assert_eq!(events[0].uri.relative_path(), "Docs/a.txt");
    assert_eq!(events[0].uri.to_uri(), "onedrive://d1/Docs/a.txt");

    // Later rounds are empty and stay silent
    let more = tokio::time::timeout(Duration::from_millis(200), watch.next_events()).await;
    assert!(more.is_err(), "unexpected extra events: {more:?}");

    let baselines = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == delta_path() && r.url.query().is_none())
        .count();
    assert_eq!(baselines, 1);
}

#[tokio::test]
async fn test_watches_on_one_drive_share_a_session() {
    let (server, fs) = common::setup_fs().await;
    mount_baseline(&server).await;
    mount_round(&server, "t1", serde_json::json!([]), "t1").await;

    let first = fs.watch(&common::uri("/Docs"), WatchOptions::default()).unwrap();
    let second = fs
        .watch(
            &common::uri("/"),
            WatchOptions {
                recursive: false,
                excludes: vec!["**/node_modules".to_string()],
            },
        )
        .unwrap();
    assert_eq!(fs.watches().active_sessions(), 1);

    let mut state = first.engine_state();
    first.dispose();
    assert_eq!(fs.watches().active_sessions(), 1);
    drop(second);
    assert_eq!(fs.watches().active_sessions(), 0);

    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| *s == EngineState::Stopped))
        .await
        .expect("engine did not stop")
        .ok();
}

#[tokio::test]
async fn test_remote_failure_ends_watch_stream() {
    let (server, fs) = common::setup_fs().await;
    mount_baseline(&server).await;
    Mock::given(method("GET"))
        .and(path(delta_path()))
        .and(query_param("token", "t1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut watch = fs.watch(&common::uri("/"), WatchOptions::default()).unwrap();
    let next = tokio::time::timeout(Duration::from_secs(5), watch.next_events())
        .await
        .expect("watch did not end");
    assert!(next.is_none());
}
