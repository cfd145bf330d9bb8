//! Recursive download, recursive delete and upload over a namespace tree.
//!
//! The engine drives per-object store and filesystem operations one object
//! at a time. Transient failures are retried with exponential backoff.
//! Per-object failures either end the operation or are collected into the
//! [`OperationSummary`], depending on the configured [`FailurePolicy`].

mod delete;
mod download;
mod upload;

use std::future::Future;
use std::path::{Component, Path};
use std::sync::Arc;

use tracing::warn;

use bucketview_core::config::transfer::{FailurePolicy, TransferConfig};
use bucketview_core::error::AppError;
use bucketview_core::events::TransferEvent;
use bucketview_core::result::AppResult;
use bucketview_core::traits::filesystem::LocalFilesystem;
use bucketview_core::traits::storage::ObjectStore;
use bucketview_core::types::{ObjectFailure, OperationSummary};

use crate::cancel::CancelSignal;
use crate::progress::ProgressTracker;

pub use upload::default_upload_key;

/// Per-operation context: where progress is reported and how cancellation
/// is observed.
#[derive(Debug, Clone, Default)]
pub struct OperationScope {
    /// Byte accounting and event publishing.
    pub tracker: ProgressTracker,
    /// Cancellation signal, checked per chunk and per object.
    pub cancel: CancelSignal,
}

impl OperationScope {
    /// Create a scope from a tracker and a cancellation signal.
    pub fn new(tracker: ProgressTracker, cancel: CancelSignal) -> Self {
        Self { tracker, cancel }
    }
}

/// Walks tree nodes and performs the object operations they stand for.
pub struct TraversalEngine {
    /// Object store bound to the session's bucket.
    store: Arc<dyn ObjectStore>,
    /// Local filesystem used as download target and upload source.
    filesystem: Arc<dyn LocalFilesystem>,
    /// Chunking, retry and failure policy settings.
    settings: TransferConfig,
}

impl std::fmt::Debug for TraversalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalEngine")
            .field("provider", &self.store.provider_type())
            .field("bucket", &self.store.bucket())
            .field("failure_policy", &self.settings.failure_policy)
            .finish()
    }
}

impl TraversalEngine {
    /// Create a new traversal engine.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        filesystem: Arc<dyn LocalFilesystem>,
        settings: TransferConfig,
    ) -> Self {
        Self {
            store,
            filesystem,
            settings,
        }
    }

    /// The object store this engine operates on.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Transfer settings in effect.
    pub fn settings(&self) -> &TransferConfig {
        &self.settings
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    async fn with_retry<T, F, Fut>(
        &self,
        key: &str,
        cancel: &CancelSignal,
        mut op: F,
    ) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 1;
        loop {
            cancel.check()?;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    self.before_retry(key, attempt, err, cancel).await?;
                    attempt += 1;
                }
            }
        }
    }

    /// Decide whether a failed attempt is retried. Returns the error when it
    /// is not; otherwise waits out the backoff and returns `Ok`.
    ///
    /// A failure observed after cancellation is reported as the cancellation.
    async fn before_retry(
        &self,
        key: &str,
        attempt: u32,
        err: AppError,
        cancel: &CancelSignal,
    ) -> AppResult<()> {
        cancel.check()?;
        let max_attempts = self.settings.max_attempts.max(1);
        if !err.is_retryable() || attempt >= max_attempts {
            return Err(err);
        }

        let delay = self.settings.backoff_for(attempt);
        warn!(
            key,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
        cancel.check()
    }

    /// Record a per-object failure, or return it if the operation must stop.
    fn record_failure(
        &self,
        summary: &mut OperationSummary,
        key: &str,
        err: AppError,
        tracker: &ProgressTracker,
    ) -> AppResult<()> {
        if err.is_fatal() || self.settings.failure_policy == FailurePolicy::Abort {
            return Err(err);
        }

        warn!(
            operation = %summary.operation,
            key,
            kind = %err.kind,
            error = %err.message,
            "Object failed, continuing"
        );
        tracker.events().emit(TransferEvent::ObjectFailed {
            key: key.to_string(),
            message: err.to_string(),
        });
        summary.failures.push(ObjectFailure::new(key, &err));
        Ok(())
    }
}

/// Accept `name` only as a single, normal local path component.
fn safe_component(name: &str) -> AppResult<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(name),
        _ => Err(AppError::validation(format!(
            "Refusing to map '{name}' to a local path"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_component() {
        assert_eq!(safe_component("photo.jpg").unwrap(), "photo.jpg");
        assert_eq!(safe_component("..hidden").unwrap(), "..hidden");
        for bad in ["", ".", "..", "a/b", "/"] {
            assert!(safe_component(bad).is_err(), "accepted {bad:?}");
        }
    }
}
