//! Integration tests for drive and item operations
//!
//! Verifies URL shapes, request bodies and response decoding of:
//! - drive discovery and paged listings
//! - path-addressed metadata, download, upload and delete
//! - id-addressed folder creation, move and copy

use graphvfs_core::domain::ItemId;
use wiremock::matchers::{body_bytes, body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, DRIVE};

fn id(s: &str) -> ItemId {
    ItemId::new(s).unwrap()
}

#[tokio::test]
async fn test_list_drives_sends_bearer_token() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path("/me/drives"))
        .and(header("Authorization", format!("Bearer {}", common::TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [
                { "id": "d1", "name": "OneDrive", "driveType": "personal",
                  "owner": { "user": { "displayName": "Test User" } } },
                { "id": "b!team", "name": "Documents", "driveType": "documentLibrary" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let drives = client.list_drives().await.expect("list drives");
    assert_eq!(drives.len(), 2);
    assert_eq!(drives[0].id.as_str(), "d1");
    assert_eq!(drives[0].owner.as_deref(), Some("Test User"));
    assert_eq!(drives[1].drive_type, "documentLibrary");
}

#[tokio::test]
async fn test_list_children_follows_next_link() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/items/F1/children")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::file_json("I1", "a.txt", "F1", "/Docs")],
            "@odata.nextLink": format!("{}/page2", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::file_json("I2", "b.txt", "F1", "/Docs")]
        })))
        .mount(&server)
        .await;

    let children = client
        .list_children(&common::drive(), &id("F1"))
        .await
        .expect("list children");
    let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a.txt", "b.txt"]);
    assert_eq!(children[0].parent.path(), Some("Docs"));
}

#[tokio::test]
async fn test_list_root_children() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root/children")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::folder_json("F1", "Docs", "R", "")]
        })))
        .mount(&server)
        .await;

    let children = client.list_root_children(&common::drive()).await.unwrap();
    assert_eq!(children.len(), 1);
    assert!(children[0].is_folder());
    assert_eq!(children[0].parent.path(), Some(""));
}

#[tokio::test]
async fn test_get_item_by_path() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root:/Docs/a.txt")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("I1", "a.txt", "F1", "/Docs")),
        )
        .mount(&server)
        .await;

    let item = client
        .get_item_by_path(&common::vpath("/Docs/a.txt"))
        .await
        .expect("get item");
    assert_eq!(item.id.as_str(), "I1");
    assert_eq!(item.size, 12);
}

#[tokio::test]
async fn test_download_by_path() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root:/Docs/a.txt:/content")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world\n".to_vec()))
        .mount(&server)
        .await;

    let bytes = client
        .download_by_path(&common::vpath("Docs/a.txt"))
        .await
        .expect("download");
    assert_eq!(bytes, b"hello world\n");
}

#[tokio::test]
async fn test_upload_by_path_sets_content_type() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("PUT"))
        .and(path(format!("/drives/{DRIVE}/root:/Docs/new.md:/content")))
        .and(header("Content-Type", "text/markdown"))
        .and(body_bytes(b"# title".to_vec()))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(common::file_json("I9", "new.md", "F1", "/Docs")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let item = client
        .upload_by_path(&common::vpath("Docs/new.md"), b"# title".to_vec(), Some("text/markdown"))
        .await
        .expect("upload");
    assert_eq!(item.id.as_str(), "I9");
}

#[tokio::test]
async fn test_upload_defaults_to_octet_stream() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("PUT"))
        .and(path(format!("/drives/{DRIVE}/root:/blob:/content")))
        .and(header("Content-Type", "application/octet-stream"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("I5", "blob", "R", "")),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .upload_by_path(&common::vpath("blob"), vec![0, 1, 2], None)
        .await
        .expect("upload");
}

#[tokio::test]
async fn test_create_folder_requests_rename_on_conflict() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("POST"))
        .and(path(format!("/drives/{DRIVE}/items/F1/children")))
        .and(body_json(serde_json::json!({
            "name": "Reports",
            "folder": {},
            "@microsoft.graph.conflictBehavior": "rename"
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(common::folder_json("F7", "Reports 1", "F1", "/Docs")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let folder = client
        .create_folder(&common::drive(), &id("F1"), "Reports")
        .await
        .expect("create folder");
    assert_eq!(folder.name, "Reports 1");
    assert!(folder.is_folder());
}

#[tokio::test]
async fn test_move_item_patches_parent_and_name() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("PATCH"))
        .and(path(format!("/drives/{DRIVE}/items/I1")))
        .and(body_json(serde_json::json!({
            "parentReference": { "id": "F2" },
            "name": "b.txt"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("I1", "b.txt", "F2", "/Archive")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let moved = client
        .move_item(&common::drive(), &id("I1"), &id("F2"), "b.txt")
        .await
        .expect("move");
    assert_eq!(moved.id.as_str(), "I1");
    assert_eq!(moved.parent.path(), Some("Archive"));
}

#[tokio::test]
async fn test_copy_item_accepted_is_done() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("POST"))
        .and(path(format!("/drives/{DRIVE}/items/I1/copy")))
        .and(body_json(serde_json::json!({
            "parentReference": { "driveId": DRIVE, "id": "F2" },
            "name": "a copy.txt"
        })))
        .respond_with(
            ResponseTemplate::new(202).insert_header("Location", "https://monitor.example/job/1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    client
        .copy_item(&common::drive(), &id("I1"), &id("F2"), "a copy.txt")
        .await
        .expect("copy");
}

#[tokio::test]
async fn test_delete_by_path_is_idempotent() {
    let (server, client) = common::setup_graph_mock().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/drives/{DRIVE}/root:/Docs/a.txt")))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/drives/{DRIVE}/root:/Docs/a.txt")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "code": "itemNotFound", "message": "Item does not exist" }
        })))
        .mount(&server)
        .await;

    let target = common::vpath("Docs/a.txt");
    client.delete_by_path(&target).await.expect("first delete");
    client.delete_by_path(&target).await.expect("second delete");
}
