//! Results of multi-object operations.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};
use crate::events::OperationKind;
use crate::types::size::format_megabytes;

/// A single object that could not be processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectFailure {
    /// Object key, or folder key when a local directory could not be created.
    pub key: String,
    /// The error category.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
}

impl ObjectFailure {
    /// Record a failure for `key`.
    pub fn new(key: impl Into<String>, error: &AppError) -> Self {
        Self {
            key: key.into(),
            kind: error.kind,
            message: error.message.clone(),
        }
    }
}

/// Outcome of a download, upload, or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSummary {
    /// What the operation did.
    pub operation: OperationKind,
    /// The key or prefix the operation targeted.
    pub target: String,
    /// Objects processed successfully.
    pub objects_succeeded: u64,
    /// Bytes transferred (zero for deletes).
    pub bytes_transferred: u64,
    /// Objects that failed.
    pub failures: Vec<ObjectFailure>,
}

impl OperationSummary {
    /// Start an empty summary.
    pub fn new(operation: OperationKind, target: impl Into<String>) -> Self {
        Self {
            operation,
            target: target.into(),
            objects_succeeded: 0,
            bytes_transferred: 0,
            failures: Vec::new(),
        }
    }

    /// Whether every object succeeded.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line status message for the presentation layer.
    pub fn status_line(&self) -> String {
        let verb = match self.operation {
            OperationKind::Download => "Download",
            OperationKind::Upload => "Upload",
            OperationKind::Delete => "Delete",
        };
        let mut line = match self.operation {
            OperationKind::Delete => format!(
                "{verb} of '{}' completed: {} object(s) deleted",
                self.target, self.objects_succeeded
            ),
            _ => format!(
                "{verb} of '{}' completed! Total size: {}",
                self.target,
                format_megabytes(self.bytes_transferred)
            ),
        };
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} failed", self.failures.len()));
        }
        line
    }
}
