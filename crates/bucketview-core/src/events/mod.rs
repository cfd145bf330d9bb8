//! Events emitted by running transfer operations.
//!
//! A background transfer publishes [`TransferEvent`]s on a channel; the
//! presentation layer consumes them to drive progress bars and status lines.

pub mod transfer;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use transfer::{OperationKind, TransferEvent};

/// A transfer event tagged with the task that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEvent {
    /// The task that emitted the event.
    pub task_id: Uuid,
    /// The event payload.
    pub event: TransferEvent,
}

impl TaskEvent {
    /// Tag an event with its task ID.
    pub fn new(task_id: Uuid, event: TransferEvent) -> Self {
        Self { task_id, event }
    }
}
