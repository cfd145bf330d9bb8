//! Single-file upload against the in-memory store.

mod helpers;

use bucketview_core::config::transfer::FailurePolicy;
use bucketview_core::error::ErrorKind;
use bucketview_service::{OperationScope, default_upload_key};
use bucketview_storage::{FaultOperation, MemoryObjectStore};

use helpers::{content, engine};

#[tokio::test]
async fn test_upload_stores_file_and_counts_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("report.csv");
    std::fs::write(&source, content("report.csv", 50)).unwrap();
    let store = MemoryObjectStore::new("bucket");

    let key = default_upload_key(&source, Some("exports")).unwrap();
    let scope = OperationScope::default();
    let summary = engine(&store, FailurePolicy::Abort)
        .upload(&source, &key, &scope)
        .await
        .unwrap();

    assert_eq!(key, "exports/report.csv");
    assert_eq!(summary.bytes_transferred, 50);
    assert_eq!(scope.tracker.bytes_transferred(), 50);
    assert_eq!(
        store.object("exports/report.csv").await.unwrap().as_ref(),
        content("report.csv", 50).as_slice()
    );
}

#[tokio::test]
async fn test_upload_retries_without_double_counting() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("data.bin");
    std::fs::write(&source, content("data.bin", 20)).unwrap();
    let store = MemoryObjectStore::new("bucket");
    store.inject_fault(FaultOperation::Put, "data.bin", ErrorKind::Transfer, 1);

    let scope = OperationScope::default();
    let summary = engine(&store, FailurePolicy::Abort)
        .upload(&source, "data.bin", &scope)
        .await
        .unwrap();

    assert_eq!(summary.objects_succeeded, 1);
    assert_eq!(scope.tracker.bytes_transferred(), 20);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_upload_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryObjectStore::new("bucket");

    let err = engine(&store, FailurePolicy::Abort)
        .upload(&dir.path().join("missing"), "missing", &OperationScope::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_upload_rejects_folder_key() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("f.txt");
    std::fs::write(&source, b"x").unwrap();
    let store = MemoryObjectStore::new("bucket");

    let summary = engine(&store, FailurePolicy::Continue)
        .upload(&source, "folder/", &OperationScope::default())
        .await
        .unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].kind, ErrorKind::Validation);
    assert!(store.is_empty().await);
}
