//! Local filesystem trait used as the download target and upload source.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::result::AppResult;
use crate::traits::storage::ByteStream;

/// Writable handle to a newly created local file.
pub type FileWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Local filesystem operations.
#[async_trait]
pub trait LocalFilesystem: Send + Sync + std::fmt::Debug + 'static {
    /// Create a directory and any missing parents. Succeeds if it exists.
    async fn create_dir_all(&self, path: &Path) -> AppResult<()>;

    /// Create (or truncate) a file for writing.
    async fn create_file(&self, path: &Path) -> AppResult<FileWriter>;

    /// Open a file and stream its contents in chunks of `chunk_size` bytes.
    async fn open_file(&self, path: &Path, chunk_size: usize) -> AppResult<ByteStream>;

    /// Size of a file in bytes.
    async fn file_size(&self, path: &Path) -> AppResult<u64>;
}
