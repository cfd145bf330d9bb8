//! Transfer progress and lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::OperationSummary;

/// The kind of top-level operation a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Download a file or folder to the local filesystem.
    Download,
    /// Upload a local file.
    Upload,
    /// Delete a file or every object under a folder prefix.
    Delete,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Download => write!(f, "download"),
            Self::Upload => write!(f, "upload"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Events emitted while an operation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransferEvent {
    /// The operation started.
    Started {
        /// What the operation does.
        operation: OperationKind,
        /// The key or prefix the operation targets.
        target: String,
    },
    /// A single object transfer started.
    FileStarted {
        /// Object key.
        key: String,
        /// Expected size in bytes.
        total_bytes: u64,
    },
    /// Bytes moved for the current object.
    Progress {
        /// Object key.
        key: String,
        /// Percentage of the current object, 0–100.
        percent: u8,
        /// Bytes moved for the current object.
        file_bytes: u64,
        /// Bytes moved across the whole operation so far.
        operation_bytes: u64,
    },
    /// A single object transfer finished.
    FileCompleted {
        /// Object key.
        key: String,
        /// Bytes moved for this object.
        bytes: u64,
    },
    /// An object was deleted.
    ObjectDeleted {
        /// Object key.
        key: String,
    },
    /// A single object failed; the operation may continue.
    ObjectFailed {
        /// Object key (or folder key for a failed directory).
        key: String,
        /// Failure description.
        message: String,
    },
    /// The operation finished (possibly with per-object failures).
    Finished {
        /// Final counts and failures.
        summary: OperationSummary,
    },
    /// The operation ended with an error.
    Aborted {
        /// Failure description.
        message: String,
    },
}
