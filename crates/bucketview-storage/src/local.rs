//! Local filesystem access backed by `tokio::fs`.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use bucketview_core::error::{AppError, ErrorKind};
use bucketview_core::result::AppResult;
use bucketview_core::traits::filesystem::{FileWriter, LocalFilesystem};
use bucketview_core::traits::storage::ByteStream;

/// Local filesystem used as download target and upload source.
#[derive(Debug, Clone, Default)]
pub struct TokioFilesystem;

impl TokioFilesystem {
    /// Create a new filesystem handle.
    pub fn new() -> Self {
        Self
    }
}

fn map_open_error(path: &Path, action: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("File not found: {}", path.display()))
    } else {
        AppError::with_source(
            ErrorKind::Filesystem,
            format!("Failed to {action}: {}", path.display()),
            e,
        )
    }
}

#[async_trait]
impl LocalFilesystem for TokioFilesystem {
    async fn create_dir_all(&self, path: &Path) -> AppResult<()> {
        fs::create_dir_all(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Filesystem,
                format!("Failed to create directory: {}", path.display()),
                e,
            )
        })?;
        debug!(path = %path.display(), "Ensured directory");
        Ok(())
    }

    async fn create_file(&self, path: &Path) -> AppResult<FileWriter> {
        let file = fs::File::create(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Filesystem,
                format!("Failed to create file: {}", path.display()),
                e,
            )
        })?;
        Ok(Box::new(file))
    }

    async fn open_file(&self, path: &Path, chunk_size: usize) -> AppResult<ByteStream> {
        let file = fs::File::open(path)
            .await
            .map_err(|e| map_open_error(path, "open file", e))?;
        Ok(Box::pin(ReaderStream::with_capacity(file, chunk_size.max(1))))
    }

    async fn file_size(&self, path: &Path) -> AppResult<u64> {
        let meta = fs::metadata(path)
            .await
            .map_err(|e| map_open_error(path, "read metadata", e))?;
        if !meta.is_file() {
            return Err(AppError::validation(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }
        Ok(meta.len())
    }
}
