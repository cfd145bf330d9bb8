//! Transfer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How a multi-object operation reacts to a failed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep processing remaining objects and report failures in the summary.
    #[default]
    Continue,
    /// Stop at the first failed object and return its error.
    Abort,
}

/// Transfer tuning and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Read size in bytes for local file streams (default 256 KB).
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: usize,
    /// Uploads larger than this are sent as multipart uploads of this part
    /// size (default 8 MB, S3 minimum is 5 MB).
    #[serde(default = "default_part_size")]
    pub multipart_part_size_bytes: usize,
    /// Attempts per object before a transient failure counts as failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay between attempts, doubled after each retry.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Whether to continue past per-object failures.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl TransferConfig {
    /// Delay before the given retry (1-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(10);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            multipart_part_size_bytes: default_part_size(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

fn default_chunk_size() -> usize {
    262_144 // 256 KB
}

fn default_part_size() -> usize {
    8_388_608 // 8 MB
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    250
}
