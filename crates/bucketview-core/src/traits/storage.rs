//! Object store trait for pluggable bucket backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::ListPage;

/// A byte stream type used for object and file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// The five object operations the traversal engine needs, bound to a
/// single bucket.
///
/// Implementations exist for S3-compatible stores and an in-memory store.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3", "memory").
    fn provider_type(&self) -> &str;

    /// Name of the bucket this store operates on.
    fn bucket(&self) -> &str;

    /// Check that the bucket is reachable with the configured credentials.
    async fn health_check(&self) -> AppResult<()>;

    /// List one page of objects, optionally restricted to a key prefix.
    async fn list_objects(
        &self,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> AppResult<ListPage>;

    /// Return the authoritative size of an object in bytes.
    async fn head_object(&self, key: &str) -> AppResult<u64>;

    /// Open an object's contents as a byte stream.
    async fn get_object(&self, key: &str) -> AppResult<ByteStream>;

    /// Store a byte stream of `size_bytes` bytes under `key`.
    ///
    /// A stream item error aborts the write; nothing is left under `key`.
    async fn put_object(&self, key: &str, body: ByteStream, size_bytes: u64) -> AppResult<()>;

    /// Delete a single object. Deleting an absent key succeeds.
    async fn delete_object(&self, key: &str) -> AppResult<()>;
}
