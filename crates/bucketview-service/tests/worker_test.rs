//! Background transfer tasks and their event streams.

mod helpers;

use std::sync::Arc;

use bucketview_core::config::transfer::FailurePolicy;
use bucketview_core::error::ErrorKind;
use bucketview_core::events::{OperationKind, TransferEvent};
use bucketview_service::{NamespaceTree, TransferRequest, TransferWorker};
use bucketview_storage::FaultOperation;

use helpers::{engine, seeded_store};

#[tokio::test]
async fn test_download_task_reports_progress_then_finishes() {
    let store = seeded_store(&[("f/a.bin", 40), ("f/b.bin", 24)]).await;
    let tree = NamespaceTree::fetch(&store).await.unwrap();
    let dest = tempfile::tempdir().unwrap();
    let worker = TransferWorker::new(Arc::new(engine(&store, FailurePolicy::Continue)));

    let mut handle = worker.spawn(TransferRequest::Download {
        node: tree.resolve("f").unwrap().to_owned_node(),
        destination: dest.path().to_path_buf(),
    });

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        assert_eq!(event.task_id, handle.task_id);
        events.push(event.event);
    }
    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.bytes_transferred, 64);

    assert_eq!(
        events.first(),
        Some(&TransferEvent::Started {
            operation: OperationKind::Download,
            target: "f".into(),
        })
    );
    assert!(matches!(events.last(), Some(TransferEvent::Finished { .. })));

    let mut last_total = 0;
    let mut percents = Vec::new();
    for event in &events {
        if let TransferEvent::Progress {
            key,
            percent,
            operation_bytes,
            ..
        } = event
        {
            assert!(*operation_bytes >= last_total);
            last_total = *operation_bytes;
            if key == "f/a.bin" {
                percents.push(*percent);
            }
        }
    }
    assert_eq!(last_total, 64);
    assert!(percents.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(percents.last(), Some(&100));
}

#[tokio::test]
async fn test_failed_task_emits_aborted() {
    let store = seeded_store(&[("x", 4)]).await;
    store.inject_fault(FaultOperation::Head, "x", ErrorKind::NotFound, 1);
    let tree = NamespaceTree::fetch(&store).await.unwrap();
    let dest = tempfile::tempdir().unwrap();
    let worker = TransferWorker::new(Arc::new(engine(&store, FailurePolicy::Abort)));

    let mut handle = worker.spawn(TransferRequest::Download {
        node: tree.resolve("x").unwrap().to_owned_node(),
        destination: dest.path().to_path_buf(),
    });

    let mut last = None;
    while let Some(event) = handle.next_event().await {
        last = Some(event.event);
    }
    assert!(matches!(last, Some(TransferEvent::Aborted { .. })));
    assert_eq!(handle.wait().await.unwrap_err().kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_cancel_stops_task() {
    let store = seeded_store(&[("slow.bin", 32)]).await;
    // Keep the task retrying long enough to observe the cancellation.
    store.inject_fault(FaultOperation::Get, "slow.bin", ErrorKind::Transfer, 100);
    let tree = NamespaceTree::fetch(&store).await.unwrap();
    let dest = tempfile::tempdir().unwrap();
    let mut settings = helpers::settings(FailurePolicy::Continue);
    settings.max_attempts = 100;
    settings.retry_backoff_ms = 20;
    let engine = bucketview_service::TraversalEngine::new(
        Arc::new(store.clone()),
        Arc::new(bucketview_storage::TokioFilesystem::new()),
        settings,
    );
    let worker = TransferWorker::new(Arc::new(engine));

    let handle = worker.spawn(TransferRequest::Download {
        node: tree.resolve("slow.bin").unwrap().to_owned_node(),
        destination: dest.path().to_path_buf(),
    });
    handle.cancel();

    let err = handle.wait().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
}

#[tokio::test]
async fn test_delete_task() {
    let store = seeded_store(&[("t/1", 1), ("t/2", 1), ("u", 1)]).await;
    let tree = NamespaceTree::fetch(&store).await.unwrap();
    let worker = TransferWorker::new(Arc::new(engine(&store, FailurePolicy::Continue)));

    let handle = worker.spawn(TransferRequest::Delete {
        node: tree.resolve("t/").unwrap().to_owned_node(),
    });
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.operation, OperationKind::Delete);
    assert_eq!(summary.objects_succeeded, 2);
    assert_eq!(store.keys().await, vec!["u"]);
}
