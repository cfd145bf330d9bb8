//! Background transfer worker.
//!
//! Runs one operation per spawned task and streams its progress back to the
//! caller over a channel. The caller can cancel the task at any time.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use bucketview_core::error::AppError;
use bucketview_core::events::{OperationKind, TaskEvent, TransferEvent};
use bucketview_core::result::AppResult;
use bucketview_core::types::OperationSummary;

use crate::cancel::{CancelHandle, cancel_pair};
use crate::progress::{EventSink, ProgressTracker};
use crate::traversal::{OperationScope, TraversalEngine};
use crate::tree::TreeNode;

/// An operation to run in the background.
#[derive(Debug, Clone)]
pub enum TransferRequest {
    /// Download a file or folder below a local directory.
    Download {
        /// The selected node (with its subtree).
        node: TreeNode,
        /// Local directory to download into.
        destination: PathBuf,
    },
    /// Delete a file, or every object under a folder.
    Delete {
        /// The selected node.
        node: TreeNode,
    },
    /// Upload a local file.
    Upload {
        /// Local file path.
        source: PathBuf,
        /// Object key to write.
        key: String,
    },
}

impl TransferRequest {
    /// The kind of operation requested.
    pub fn operation(&self) -> OperationKind {
        match self {
            Self::Download { .. } => OperationKind::Download,
            Self::Delete { .. } => OperationKind::Delete,
            Self::Upload { .. } => OperationKind::Upload,
        }
    }

    /// The key or prefix the operation targets.
    pub fn target(&self) -> &str {
        match self {
            Self::Download { node, .. } | Self::Delete { node } => node.full_key(),
            Self::Upload { key, .. } => key,
        }
    }
}

/// Handle to a running background operation.
#[derive(Debug)]
pub struct TransferHandle {
    /// Task identifier; every event carries it.
    pub task_id: Uuid,
    /// Cancels the task.
    pub cancel: CancelHandle,
    events: mpsc::UnboundedReceiver<TaskEvent>,
    join: JoinHandle<AppResult<OperationSummary>>,
}

impl TransferHandle {
    /// Next event from the task. Returns `None` once the task has finished
    /// and every event has been received.
    pub async fn next_event(&mut self) -> Option<TaskEvent> {
        self.events.recv().await
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the task to finish and return its result.
    pub async fn wait(self) -> AppResult<OperationSummary> {
        self.join
            .await
            .map_err(|e| AppError::internal(format!("Transfer task failed: {e}")))?
    }
}

/// Spawns traversal operations as background tasks.
#[derive(Debug, Clone)]
pub struct TransferWorker {
    /// Engine shared by all spawned tasks.
    engine: Arc<TraversalEngine>,
}

impl TransferWorker {
    /// Create a new worker.
    pub fn new(engine: Arc<TraversalEngine>) -> Self {
        Self { engine }
    }

    /// Start `request` on a new task.
    pub fn spawn(&self, request: TransferRequest) -> TransferHandle {
        let task_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        let (cancel, signal) = cancel_pair();
        let events = EventSink::new(task_id, tx);
        let scope = OperationScope::new(ProgressTracker::with_events(events.clone()), signal);
        let engine = Arc::clone(&self.engine);

        info!(
            task_id = %task_id,
            operation = %request.operation(),
            target_key = request.target(),
            "Starting transfer task"
        );

        let join = tokio::spawn(async move {
            events.emit(TransferEvent::Started {
                operation: request.operation(),
                target: request.target().to_string(),
            });

            let result = execute(&engine, &request, &scope).await;
            match &result {
                Ok(summary) => {
                    info!(task_id = %task_id, "{}", summary.status_line());
                    events.emit(TransferEvent::Finished {
                        summary: summary.clone(),
                    });
                }
                Err(err) => {
                    warn!(task_id = %task_id, error = %err, "Transfer task aborted");
                    events.emit(TransferEvent::Aborted {
                        message: err.to_string(),
                    });
                }
            }
            result
        });

        TransferHandle {
            task_id,
            cancel,
            events: rx,
            join,
        }
    }
}

async fn execute(
    engine: &TraversalEngine,
    request: &TransferRequest,
    scope: &OperationScope,
) -> AppResult<OperationSummary> {
    match request {
        TransferRequest::Download { node, destination } => {
            engine.download(node.as_node_ref(), destination, scope).await
        }
        TransferRequest::Delete { node } => engine.delete(node.as_node_ref(), scope).await,
        TransferRequest::Upload { source, key } => engine.upload(source, key, scope).await,
    }
}
