//! Byte accounting for multi-object transfers.
//!
//! A [`ProgressTracker`] is created per operation and passed explicitly into
//! the traversal. Each object transfer gets a [`FileProgress`] scoped to its
//! expected size. The operation total is an atomic counter, so clones of the
//! tracker can be read from other tasks while the transfer runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use tokio::sync::mpsc;
use uuid::Uuid;

use bucketview_core::events::{TaskEvent, TransferEvent};

/// Publishes transfer events for one task. A sink without a channel drops
/// every event.
#[derive(Debug, Clone)]
pub struct EventSink {
    task_id: Uuid,
    tx: Option<mpsc::UnboundedSender<TaskEvent>>,
}

impl EventSink {
    /// A sink sending to `tx`, tagging events with `task_id`.
    pub fn new(task_id: Uuid, tx: mpsc::UnboundedSender<TaskEvent>) -> Self {
        Self {
            task_id,
            tx: Some(tx),
        }
    }

    /// A sink that discards events.
    pub fn disabled() -> Self {
        Self {
            task_id: Uuid::nil(),
            tx: None,
        }
    }

    /// Publish an event. A closed receiver is not an error.
    pub fn emit(&self, event: TransferEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(TaskEvent::new(self.task_id, event));
        }
    }
}

/// Running byte total for one logical operation.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    operation_bytes: Arc<AtomicU64>,
    events: EventSink,
}

impl ProgressTracker {
    /// A tracker that reports nothing.
    pub fn new() -> Self {
        Self::with_events(EventSink::disabled())
    }

    /// A tracker that publishes progress events to `events`.
    pub fn with_events(events: EventSink) -> Self {
        Self {
            operation_bytes: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    /// Begin tracking one object of `expected_bytes`.
    pub fn start_file(&self, key: &str, expected_bytes: u64) -> FileProgress {
        self.events.emit(TransferEvent::FileStarted {
            key: key.to_string(),
            total_bytes: expected_bytes,
        });
        FileProgress {
            inner: Arc::new(FileCounters {
                key: key.to_string(),
                expected_bytes,
                attempt_bytes: AtomicU64::new(0),
                high_water: AtomicU64::new(0),
                last_percent: AtomicU8::new(percent_of(0, expected_bytes)),
                operation_bytes: Arc::clone(&self.operation_bytes),
                events: self.events.clone(),
            }),
        }
    }

    /// Bytes counted across the whole operation so far.
    pub fn bytes_transferred(&self) -> u64 {
        self.operation_bytes.load(Ordering::Acquire)
    }

    /// The event sink this tracker reports to.
    pub fn events(&self) -> &EventSink {
        &self.events
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress of a single object transfer.
///
/// Bytes are counted per attempt. When an attempt is restarted, only bytes
/// beyond the furthest point any earlier attempt reached are added to the
/// operation total, so neither the percentage nor the total ever goes back.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct FileProgress {
    inner: Arc<FileCounters>,
}

#[derive(Debug)]
struct FileCounters {
    key: String,
    expected_bytes: u64,
    attempt_bytes: AtomicU64,
    high_water: AtomicU64,
    last_percent: AtomicU8,
    operation_bytes: Arc<AtomicU64>,
    events: EventSink,
}

impl FileProgress {
    /// Record `n` more bytes in the current attempt and return the percent.
    pub fn advance(&self, n: u64) -> u8 {
        let inner = &self.inner;
        let attempt = inner.attempt_bytes.fetch_add(n, Ordering::AcqRel) + n;
        let previous = inner.high_water.fetch_max(attempt, Ordering::AcqRel);
        if attempt <= previous {
            return self.percent();
        }

        let delta = attempt - previous;
        let total = inner.operation_bytes.fetch_add(delta, Ordering::AcqRel) + delta;
        let percent = percent_of(attempt, inner.expected_bytes);
        let percent = inner.last_percent.fetch_max(percent, Ordering::AcqRel).max(percent);
        inner.events.emit(TransferEvent::Progress {
            key: inner.key.clone(),
            percent,
            file_bytes: attempt,
            operation_bytes: total,
        });
        percent
    }

    /// Start a new attempt from byte zero.
    pub fn restart_attempt(&self) {
        self.inner.attempt_bytes.store(0, Ordering::Release);
    }

    /// Current percentage, 0 to 100.
    pub fn percent(&self) -> u8 {
        self.inner.last_percent.load(Ordering::Acquire)
    }

    /// Bytes counted for this object.
    pub fn bytes_transferred(&self) -> u64 {
        self.inner.high_water.load(Ordering::Acquire)
    }

    /// Size the object was expected to have.
    pub fn expected_bytes(&self) -> u64 {
        self.inner.expected_bytes
    }

    /// Mark the object as done and return the bytes counted for it.
    pub fn complete(&self) -> u64 {
        let bytes = self.bytes_transferred();
        self.inner.events.emit(TransferEvent::FileCompleted {
            key: self.inner.key.clone(),
            bytes,
        });
        bytes
    }
}

/// `floor(100 * transferred / expected)`, clamped to 100. An expected size of
/// zero is complete immediately.
pub fn percent_of(transferred: u64, expected: u64) -> u8 {
    if expected == 0 {
        return 100;
    }
    let percent = (transferred as u128 * 100) / expected as u128;
    percent.min(100) as u8
}
