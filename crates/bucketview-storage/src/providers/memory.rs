//! In-memory object store.
//!
//! Keeps objects in a sorted map so listings come back in key order, like an
//! S3 bucket. Used as the storage double in tests and supports injecting
//! failures per operation and key.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use tracing::debug;

use bucketview_core::error::{AppError, ErrorKind};
use bucketview_core::result::AppResult;
use bucketview_core::traits::storage::{ByteStream, ObjectStore};
use bucketview_core::types::{ListPage, ObjectEntry};

const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultOperation {
    /// `head_object`
    Head,
    /// `get_object` fails before returning a stream.
    Get,
    /// `get_object` returns a stream that breaks after its first chunk.
    GetStream,
    /// `get_object` returns a stream that ends cleanly after its first chunk.
    GetTruncated,
    /// `put_object`
    Put,
    /// `delete_object`
    Delete,
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    kind: ErrorKind,
    remaining: u32,
}

/// Object store holding every object in memory.
#[derive(Debug, Clone)]
pub struct MemoryObjectStore {
    /// Bucket name reported to callers.
    bucket: String,
    /// Stored objects by key.
    objects: Arc<RwLock<BTreeMap<String, Bytes>>>,
    /// Pending injected failures.
    faults: Arc<Mutex<HashMap<(FaultOperation, String), Fault>>>,
    /// Every operation fails with an authentication error when set.
    credentials_rejected: Arc<AtomicBool>,
    /// Maximum entries per listing page.
    page_size: usize,
    /// Chunk size of `get_object` streams.
    chunk_size: usize,
}

impl MemoryObjectStore {
    /// Create an empty store for the given bucket name.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Arc::new(RwLock::new(BTreeMap::new())),
            faults: Arc::new(Mutex::new(HashMap::new())),
            credentials_rejected: Arc::new(AtomicBool::new(false)),
            page_size: DEFAULT_PAGE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the maximum number of entries per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the chunk size used when streaming objects out.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Store an object directly.
    pub async fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        self.objects.write().await.insert(key.into(), data.into());
    }

    /// Contents of an object, if present.
    pub async fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).cloned()
    }

    /// All stored keys in order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Make the next `times` calls of `operation` on `key` fail with `kind`.
    pub fn inject_fault(&self, operation: FaultOperation, key: &str, kind: ErrorKind, times: u32) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(
                (operation, key.to_string()),
                Fault {
                    kind,
                    remaining: times,
                },
            );
        }
    }

    /// Reject every subsequent call as unauthenticated.
    pub fn reject_credentials(&self) {
        self.credentials_rejected.store(true, Ordering::SeqCst);
    }

    fn check_credentials(&self) -> AppResult<()> {
        if self.credentials_rejected.load(Ordering::SeqCst) {
            return Err(AppError::authentication(format!(
                "Invalid credentials for bucket '{}'",
                self.bucket
            )));
        }
        Ok(())
    }

    /// Consume one pending fault for the operation and key, if any.
    fn take_fault(&self, operation: FaultOperation, key: &str) -> Option<ErrorKind> {
        let mut faults = self.faults.lock().ok()?;
        let entry_key = (operation, key.to_string());
        let fault = faults.get_mut(&entry_key)?;
        let kind = fault.kind;
        fault.remaining = fault.remaining.saturating_sub(1);
        if fault.remaining == 0 {
            faults.remove(&entry_key);
        }
        Some(kind)
    }

    fn check_fault(&self, operation: FaultOperation, key: &str) -> AppResult<()> {
        match self.take_fault(operation, key) {
            Some(kind) => Err(AppError::new(
                kind,
                format!("Injected {operation:?} failure for '{key}'"),
            )),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> AppResult<()> {
        self.check_credentials()
    }

    async fn list_objects(
        &self,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> AppResult<ListPage> {
        self.check_credentials()?;
        let prefix = prefix.unwrap_or("");
        let objects = self.objects.read().await;

        // The token is the last key of the previous page, so deleting
        // already-listed keys between pages does not skip anything.
        let lower = match continuation_token {
            Some(token) => Bound::Excluded(token),
            None => Bound::Unbounded,
        };

        let mut matching = objects
            .range::<str, _>((lower, Bound::Unbounded))
            .filter(|(key, _)| key.starts_with(prefix));

        let entries: Vec<ObjectEntry> = matching
            .by_ref()
            .take(self.page_size)
            .map(|(key, data)| ObjectEntry::new(key.clone(), data.len() as u64))
            .collect();

        let next_token = if matching.next().is_some() {
            entries.last().map(|e| e.key.clone())
        } else {
            None
        };

        Ok(ListPage {
            entries,
            next_token,
        })
    }

    async fn head_object(&self, key: &str) -> AppResult<u64> {
        self.check_credentials()?;
        self.check_fault(FaultOperation::Head, key)?;
        self.objects
            .read()
            .await
            .get(key)
            .map(|data| data.len() as u64)
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }

    async fn get_object(&self, key: &str) -> AppResult<ByteStream> {
        self.check_credentials()?;
        self.check_fault(FaultOperation::Get, key)?;
        let data = self
            .objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))?;

        let mut chunks: Vec<Result<Bytes, std::io::Error>> = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            let end = (offset + self.chunk_size).min(data.len());
            chunks.push(Ok(data.slice(offset..end)));
            offset = end;
        }

        if self.take_fault(FaultOperation::GetStream, key).is_some() {
            chunks.truncate(1);
            chunks.push(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                format!("Injected stream failure for '{key}'"),
            )));
        }

        if self.take_fault(FaultOperation::GetTruncated, key).is_some() {
            chunks.truncate(1);
        }

        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn put_object(&self, key: &str, mut body: ByteStream, size_bytes: u64) -> AppResult<()> {
        self.check_credentials()?;
        self.check_fault(FaultOperation::Put, key)?;

        let mut buffer = BytesMut::with_capacity(size_bytes as usize);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Transfer,
                    format!("Upload stream failed for '{key}'"),
                    e,
                )
            })?;
            buffer.extend_from_slice(&chunk);
        }

        if buffer.len() as u64 != size_bytes {
            return Err(AppError::transfer(format!(
                "Upload of '{key}' sent {} bytes, expected {size_bytes}",
                buffer.len()
            )));
        }

        self.objects
            .write()
            .await
            .insert(key.to_string(), buffer.freeze());
        debug!(key, bytes = size_bytes, "Stored object in memory");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        self.check_credentials()?;
        self.check_fault(FaultOperation::Delete, key)?;
        self.objects.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut stream: ByteStream) -> Result<Vec<u8>, std::io::Error> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }

    #[tokio::test]
    async fn test_list_paginates_in_key_order() {
        let store = MemoryObjectStore::new("test").with_page_size(2);
        for key in ["c", "a", "b", "d", "e"] {
            store.insert(key, Bytes::from_static(b"x")).await;
        }

        let first = store.list_objects(None, None).await.unwrap();
        let keys: Vec<_> = first.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(first.next_token.as_deref(), Some("b"));

        let second = store
            .list_objects(None, first.next_token.as_deref())
            .await
            .unwrap();
        assert_eq!(second.entries[0].key, "c");

        let third = store
            .list_objects(None, second.next_token.as_deref())
            .await
            .unwrap();
        assert_eq!(third.entries.len(), 1);
        assert!(third.next_token.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix() {
        let store = MemoryObjectStore::new("test");
        store.insert("a/1", Bytes::from_static(b"1")).await;
        store.insert("a/2", Bytes::from_static(b"22")).await;
        store.insert("ab", Bytes::from_static(b"3")).await;

        let page = store.list_objects(Some("a/"), None).await.unwrap();
        assert_eq!(
            page.entries,
            vec![ObjectEntry::new("a/1", 1), ObjectEntry::new("a/2", 2)]
        );
    }

    #[tokio::test]
    async fn test_get_streams_in_chunks() {
        let store = MemoryObjectStore::new("test").with_chunk_size(3);
        store.insert("k", Bytes::from_static(b"abcdefgh")).await;

        let data = collect(store.get_object("k").await.unwrap()).await.unwrap();
        assert_eq!(data, b"abcdefgh");
        assert_eq!(store.head_object("k").await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let store = MemoryObjectStore::new("test");
        let err = store.head_object("nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_injected_faults_are_consumed() {
        let store = MemoryObjectStore::new("test");
        store.insert("k", Bytes::from_static(b"data")).await;
        store.inject_fault(FaultOperation::Delete, "k", ErrorKind::Transfer, 1);

        let err = store.delete_object("k").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transfer);
        store.delete_object("k").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_stream_fault_breaks_after_first_chunk() {
        let store = MemoryObjectStore::new("test").with_chunk_size(2);
        store.insert("k", Bytes::from_static(b"abcdef")).await;
        store.inject_fault(FaultOperation::GetStream, "k", ErrorKind::Transfer, 1);

        assert!(collect(store.get_object("k").await.unwrap()).await.is_err());
        assert_eq!(
            collect(store.get_object("k").await.unwrap()).await.unwrap(),
            b"abcdef"
        );
    }

    #[tokio::test]
    async fn test_put_rejects_broken_stream() {
        let store = MemoryObjectStore::new("test");
        let body: ByteStream = Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Err(std::io::Error::other("boom")),
        ]));

        let err = store.put_object("k", body, 4).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transfer);
        assert!(store.object("k").await.is_none());
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let store = MemoryObjectStore::new("test");
        store.reject_credentials();
        let err = store.health_check().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
