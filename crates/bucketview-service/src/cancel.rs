//! Cooperative cancellation for running operations.

use std::sync::Arc;

use tokio::sync::watch;

use bucketview_core::error::AppError;
use bucketview_core::result::AppResult;

/// Receiving side of a cancellation signal, checked between chunks and
/// between objects.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

/// Sending side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

/// Create a connected handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), CancelSignal(rx))
}

impl CancelSignal {
    /// Wrap an existing watch receiver.
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self(rx)
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self(rx)
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Return a cancellation error if cancellation was requested.
    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            Err(AppError::cancelled("Operation cancelled"))
        } else {
            Ok(())
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    /// Whether cancellation was already requested.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}
