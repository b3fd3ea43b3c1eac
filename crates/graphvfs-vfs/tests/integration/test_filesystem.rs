//! Integration tests for filesystem operations
//!
//! Drive layout used throughout: root `R` containing folder `Docs` (`F1`)
//! containing file `a.txt` (`I1`).

use graphvfs_vfs::{DirEntry, FileType, VfsError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, DRIVE};

#[tokio::test]
async fn test_list_read_rename_stat_scenario() {
    let (server, fs) = common::setup_fs().await;

    // list("/")
    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/root")))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::root_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/items/R/children")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [common::folder_json("F1", "Docs", "")]
        })))
        .mount(&server)
        .await;

    let entries = fs.list(&common::uri("/")).await.expect("list root");
    assert_eq!(
        entries,
        [DirEntry {
            name: "Docs".to_string(),
            kind: FileType::Directory
        }]
    );

    // read("/Docs/a.txt")
    Mock::given(method("GET"))
        .and(path(format!("{}:/content", common::item_path("Docs/a.txt"))))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .mount(&server)
        .await;

    assert_eq!(fs.read(&common::uri("Docs/a.txt")).await.unwrap(), b"hello");

    // rename("/Docs/a.txt", "/Docs/b.txt"): a.txt exists once, then is gone
    Mock::given(method("GET"))
        .and(path(common::item_path("Docs/a.txt")))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::file_json("I1", "a.txt", "/Docs")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    common::mount_missing(&server, "Docs/a.txt").await;
    common::mount_item(&server, "Docs", common::folder_json("F1", "Docs", "")).await;

    Mock::given(method("PATCH"))
        .and(path(format!("/drives/{DRIVE}/items/I1")))
        .and(body_json(serde_json::json!({
            "parentReference": { "id": "F1" },
            "name": "b.txt"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::file_json("I1", "b.txt", "/Docs")))
        .expect(1)
        .mount(&server)
        .await;

    fs.rename(&common::uri("Docs/a.txt"), &common::uri("Docs/b.txt"))
        .await
        .expect("rename");

    // stat afterwards
    common::mount_item(&server, "Docs/b.txt", common::file_json("I1", "b.txt", "/Docs")).await;

    let stat = fs.stat(&common::uri("Docs/b.txt")).await.expect("stat new name");
    assert_eq!(stat.kind, FileType::File);
    assert_eq!(stat.size, 5);
    assert!(stat.ctime.unwrap() < stat.mtime.unwrap());

    let err = fs.stat(&common::uri("Docs/a.txt")).await.unwrap_err();
    assert!(err.is_not_found(), "expected not found, got {err:?}");
}

#[tokio::test]
async fn test_missing_items_are_not_found() {
    let (server, fs) = common::setup_fs().await;
    common::mount_missing(&server, "nope").await;
    Mock::given(method("GET"))
        .and(path(format!("{}:/content", common::item_path("nope"))))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = common::uri("nope");
    assert!(matches!(fs.stat(&uri).await, Err(VfsError::NotFound(ref u)) if *u == uri));
    assert!(fs.list(&uri).await.unwrap_err().is_not_found());
    assert!(fs.read(&uri).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_list_not_found_at_children_step() {
    let (server, fs) = common::setup_fs().await;
    common::mount_item(&server, "Docs", common::folder_json("F1", "Docs", "")).await;
    Mock::given(method("GET"))
        .and(path(format!("/drives/{DRIVE}/items/F1/children")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(fs.list(&common::uri("Docs")).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_remote_errors_propagate_unchanged() {
    let (server, fs) = common::setup_fs().await;
    Mock::given(method("GET"))
        .and(path(common::item_path("Docs")))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = fs.stat(&common::uri("Docs")).await.unwrap_err();
    match err {
        VfsError::Remote(remote) => assert_eq!(remote.status(), Some(503)),
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_write_uploads_with_guessed_mime_type() {
    let (server, fs) = common::setup_fs().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}:/content", common::item_path("Docs/notes.md"))))
        .and(header("Content-Type", "text/markdown"))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::file_json("I7", "notes.md", "/Docs")))
        .expect(1)
        .mount(&server)
        .await;

    fs.write(&common::uri("Docs/notes.md"), b"# notes".to_vec())
        .await
        .expect("write");
}

#[tokio::test]
async fn test_write_to_root_is_invalid() {
    let (_server, fs) = common::setup_fs().await;
    let err = fs.write(&common::uri("/"), vec![]).await.unwrap_err();
    assert!(matches!(err, VfsError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_create_directory_under_resolved_parent() {
    let (server, fs) = common::setup_fs().await;
    common::mount_item(&server, "Docs", common::folder_json("F1", "Docs", "")).await;
    Mock::given(method("POST"))
        .and(path(format!("/drives/{DRIVE}/items/F1/children")))
        .and(body_json(serde_json::json!({
            "name": "Reports",
            "folder": {},
            "@microsoft.graph.conflictBehavior": "rename"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(common::folder_json("F5", "Reports 1", "/Docs")))
        .expect(1)
        .mount(&server)
        .await;

    fs.create_directory(&common::uri("Docs/Reports"))
        .await
        .expect("create directory");
}

#[tokio::test]
async fn test_create_directory_missing_parent() {
    let (server, fs) = common::setup_fs().await;
    common::mount_missing(&server, "Nope").await;

    let err = fs.create_directory(&common::uri("Nope/Reports")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (server, fs) = common::setup_fs().await;
    Mock::given(method("DELETE"))
        .and(path(common::item_path("Docs/a.txt")))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(common::item_path("Docs/a.txt")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uri = common::uri("Docs/a.txt");
    fs.delete(&uri).await.expect("first delete");
    fs.delete(&uri).await.expect("second delete succeeds too");
}

#[tokio::test]
async fn test_delete_propagates_other_errors() {
    let (server, fs) = common::setup_fs().await;
    Mock::given(method("DELETE"))
        .and(path(common::item_path("Docs/a.txt")))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = fs.delete(&common::uri("Docs/a.txt")).await.unwrap_err();
    assert!(matches!(err, VfsError::Remote(ref e) if e.status() == Some(403)));
}

#[tokio::test]
async fn test_rename_into_missing_folder_makes_no_move_call() {
    let (server, fs) = common::setup_fs().await;
    common::mount_item(&server, "Docs/a.txt", common::file_json("I1", "a.txt", "/Docs")).await;
    common::mount_missing(&server, "Archive").await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = fs
        .rename(&common::uri("Docs/a.txt"), &common::uri("Archive/a.txt"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_copy_to_other_folder() {
    let (server, fs) = common::setup_fs().await;
    common::mount_item(&server, "Docs/a.txt", common::file_json("I1", "a.txt", "/Docs")).await;
    common::mount_item(&server, "Archive", common::folder_json("F2", "Archive", "")).await;
    Mock::given(method("POST"))
        .and(path(format!("/drives/{DRIVE}/items/I1/copy")))
        .and(body_json(serde_json::json!({
            "parentReference": { "driveId": DRIVE, "id": "F2" },
            "name": "a.txt"
        })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    fs.copy(&common::uri("Docs/a.txt"), &common::uri("Archive/a.txt"))
        .await
        .expect("copy");
}

#[tokio::test]
async fn test_cross_drive_rename_rejected() {
    let (_server, fs) = common::setup_fs().await;
    let err = fs
        .rename(&common::uri("a.txt"), "onedrive://other/a.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, VfsError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_foreign_scheme_is_invalid_uri() {
    let (_server, fs) = common::setup_fs().await;
    let err = fs.stat("file:///etc/hosts").await.unwrap_err();
    assert!(matches!(err, VfsError::InvalidUri(_)));
}
