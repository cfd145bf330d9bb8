//! Bucket sessions: connect, lookup and refresh after mutations.

mod helpers;

use std::sync::Arc;

use bucketview_core::config::transfer::FailurePolicy;
use bucketview_core::error::ErrorKind;
use bucketview_service::{BucketSession, OperationScope, TreeNode};
use bucketview_storage::{MemoryObjectStore, TokioFilesystem};

use helpers::{seeded_store, settings};

async fn connect(store: &MemoryObjectStore) -> BucketSession {
    BucketSession::connect(
        Arc::new(store.clone()),
        Arc::new(TokioFilesystem::new()),
        settings(FailurePolicy::Continue),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_connect_builds_tree_from_every_page() {
    let store = seeded_store(&[
        ("a/1", 1024),
        ("a/2", 1024),
        ("b/3", 1024),
        ("c", 1024),
        ("d/", 0),
    ])
    .await;

    let session = connect(&store).await;

    assert_eq!(session.bucket(), "test-bucket");
    assert_eq!(session.tree().object_count, 5);
    assert_eq!(session.tree().total_size_bytes(), 4096);
    assert!(matches!(session.resolve("a").unwrap(), TreeNode::Folder(_)));
    assert!(matches!(session.resolve("c").unwrap(), TreeNode::File(_)));
    assert_eq!(
        session.resolve("nope").unwrap_err().kind,
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_connect_rejected_credentials() {
    let store = MemoryObjectStore::new("bucket");
    store.reject_credentials();

    let err = BucketSession::connect(
        Arc::new(store),
        Arc::new(TokioFilesystem::new()),
        settings(FailurePolicy::Continue),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Authentication);
}

#[tokio::test]
async fn test_delete_refreshes_tree() {
    let store = seeded_store(&[("keep.txt", 2), ("gone/a", 3), ("gone/b", 4)]).await;
    let mut session = connect(&store).await;
    assert_eq!(session.tree().total_size_bytes(), 9);

    let summary = session
        .delete("gone", &OperationScope::default())
        .await
        .unwrap();

    assert_eq!(summary.objects_succeeded, 2);
    assert_eq!(session.tree().object_count, 1);
    assert_eq!(session.tree().total_size_bytes(), 2);
    assert!(session.resolve("gone").is_err());
}

#[tokio::test]
async fn test_upload_refreshes_tree() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("new.txt");
    std::fs::write(&source, b"hello").unwrap();
    let store = seeded_store(&[("old.txt", 1)]).await;
    let mut session = connect(&store).await;

    let summary = session
        .upload(&source, None, &OperationScope::default())
        .await
        .unwrap();

    assert_eq!(summary.target, "new.txt");
    assert_eq!(session.tree().object_count, 2);
    assert_eq!(session.tree().total_size_bytes(), 6);
    assert!(matches!(session.resolve("new.txt").unwrap(), TreeNode::File(_)));
}

#[tokio::test]
async fn test_spawned_upload_then_refresh() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("up.bin");
    std::fs::write(&source, vec![1u8; 30]).unwrap();
    let store = seeded_store(&[]).await;
    let mut session = connect(&store).await;

    let handle = session
        .spawn_upload(&source, Some("in/up.bin"))
        .unwrap();
    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.bytes_transferred, 30);

    session.refresh().await.unwrap();
    assert_eq!(
        session
            .tree()
            .root
            .find_folder("in")
            .unwrap()
            .aggregate_size_bytes,
        30
    );
}

#[tokio::test]
async fn test_download_by_path() {
    let store = seeded_store(&[("docs/a.txt", 12), ("docs/sub/b.txt", 8)]).await;
    let session = connect(&store).await;
    let dest = tempfile::tempdir().unwrap();

    let summary = session
        .download("docs/", dest.path(), &OperationScope::default())
        .await
        .unwrap();

    assert_eq!(summary.bytes_transferred, 20);
    assert_eq!(
        helpers::files_on_disk(dest.path()),
        vec![
            ("docs/a.txt".to_string(), 12),
            ("docs/sub/b.txt".to_string(), 8),
        ]
    );
}
