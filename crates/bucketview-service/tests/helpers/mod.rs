//! Shared fixtures for service integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use bucketview_core::config::transfer::{FailurePolicy, TransferConfig};
use bucketview_core::error::AppError;
use bucketview_core::result::AppResult;
use bucketview_core::traits::filesystem::{FileWriter, LocalFilesystem};
use bucketview_core::traits::storage::ByteStream;
use bucketview_service::TraversalEngine;
use bucketview_storage::{MemoryObjectStore, TokioFilesystem};

/// Deterministic content of `len` bytes for `key`.
pub fn content(key: &str, len: usize) -> Vec<u8> {
    let seed = key.bytes().fold(0u8, |acc, b| acc.wrapping_add(b));
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

/// A store holding `objects` as `(key, size)` pairs.
pub async fn seeded_store(objects: &[(&str, usize)]) -> MemoryObjectStore {
    let store = MemoryObjectStore::new("test-bucket")
        .with_page_size(2)
        .with_chunk_size(16);
    for (key, size) in objects {
        store.insert(*key, content(key, *size)).await;
    }
    store
}

/// Transfer settings with fast retries.
pub fn settings(policy: FailurePolicy) -> TransferConfig {
    TransferConfig {
        chunk_size_bytes: 8,
        max_attempts: 3,
        retry_backoff_ms: 1,
        failure_policy: policy,
        ..Default::default()
    }
}

/// An engine over `store` writing to the real filesystem.
pub fn engine(store: &MemoryObjectStore, policy: FailurePolicy) -> TraversalEngine {
    TraversalEngine::new(
        Arc::new(store.clone()),
        Arc::new(TokioFilesystem::new()),
        settings(policy),
    )
}

/// A filesystem that refuses to create files or directories whose final
/// component equals one of `blocked`.
#[derive(Debug)]
pub struct BlockingFilesystem {
    inner: TokioFilesystem,
    blocked: Vec<String>,
}

impl BlockingFilesystem {
    pub fn new(blocked: &[&str]) -> Self {
        Self {
            inner: TokioFilesystem::new(),
            blocked: blocked.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn check(&self, path: &Path) -> AppResult<()> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.blocked.iter().any(|b| b == name) {
            return Err(AppError::filesystem(format!(
                "Permission denied: {}",
                path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl LocalFilesystem for BlockingFilesystem {
    async fn create_dir_all(&self, path: &Path) -> AppResult<()> {
        self.check(path)?;
        self.inner.create_dir_all(path).await
    }

    async fn create_file(&self, path: &Path) -> AppResult<FileWriter> {
        self.check(path)?;
        self.inner.create_file(path).await
    }

    async fn open_file(&self, path: &Path, chunk_size: usize) -> AppResult<ByteStream> {
        self.inner.open_file(path, chunk_size).await
    }

    async fn file_size(&self, path: &Path) -> AppResult<u64> {
        self.inner.file_size(path).await
    }
}

/// Every regular file below `root`, as sorted `/`-joined relative paths with
/// their sizes.
pub fn files_on_disk(root: &Path) -> Vec<(String, u64)> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<(String, u64)>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path: PathBuf = entry.unwrap().path();
            if path.is_dir() {
                walk(&path, root, out);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push((key, std::fs::metadata(&path).unwrap().len()));
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
