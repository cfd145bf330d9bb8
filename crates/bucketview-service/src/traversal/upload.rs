//! Single-file upload.

use std::io;
use std::path::Path;

use futures::StreamExt;
use tracing::{debug, info};

use bucketview_core::error::AppError;
use bucketview_core::events::OperationKind;
use bucketview_core::result::AppResult;
use bucketview_core::traits::storage::ByteStream;
use bucketview_core::types::{KEY_DELIMITER, OperationSummary, format_megabytes};

use super::{OperationScope, TraversalEngine};
use crate::cancel::CancelSignal;
use crate::progress::FileProgress;

impl TraversalEngine {
    /// Upload the local file at `source` as object `key`.
    pub async fn upload(
        &self,
        source: &Path,
        key: &str,
        scope: &OperationScope,
    ) -> AppResult<OperationSummary> {
        let mut summary = OperationSummary::new(OperationKind::Upload, key);
        match self.upload_file(source, key, scope).await {
            Ok(bytes) => {
                summary.objects_succeeded = 1;
                summary.bytes_transferred = bytes;
            }
            Err(err) => self.record_failure(&mut summary, key, err, &scope.tracker)?,
        }

        info!(
            bucket = self.store.bucket(),
            key,
            source = %source.display(),
            total = %format_megabytes(summary.bytes_transferred),
            failed = summary.failures.len(),
            "Upload finished"
        );
        Ok(summary)
    }

    async fn upload_file(
        &self,
        source: &Path,
        key: &str,
        scope: &OperationScope,
    ) -> AppResult<u64> {
        if key.is_empty() || key.ends_with(KEY_DELIMITER) {
            return Err(AppError::validation(format!(
                "Invalid object key for upload: '{key}'"
            )));
        }

        let size = self.filesystem.file_size(source).await?;
        let progress = scope.tracker.start_file(key, size);

        let mut attempt = 1;
        loop {
            scope.cancel.check()?;
            let body = self
                .filesystem
                .open_file(source, self.settings.chunk_size_bytes)
                .await?;
            let body = tracked(body, progress.clone(), scope.cancel.clone());
            match self.store.put_object(key, body, size).await {
                Ok(()) => break,
                Err(err) => {
                    self.before_retry(key, attempt, err, &scope.cancel).await?;
                    progress.restart_attempt();
                    attempt += 1;
                }
            }
        }

        let bytes = progress.complete();
        debug!(key, bytes, attempts = attempt, "Uploaded object");
        Ok(bytes)
    }
}

/// Count bytes as the store pulls them and stop the stream once
/// cancellation is requested.
fn tracked(body: ByteStream, progress: FileProgress, cancel: CancelSignal) -> ByteStream {
    Box::pin(body.map(move |chunk| {
        if cancel.is_cancelled() {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "upload cancelled"));
        }
        if let Ok(bytes) = &chunk {
            progress.advance(bytes.len() as u64);
        }
        chunk
    }))
}

/// The object key for an upload: the file name, placed under `prefix` when
/// one is given.
pub fn default_upload_key(source: &Path, prefix: Option<&str>) -> AppResult<String> {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            AppError::validation(format!(
                "Cannot derive an object key from {}",
                source.display()
            ))
        })?;

    let prefix = prefix
        .map(|p| p.trim_matches(KEY_DELIMITER))
        .filter(|p| !p.is_empty());
    Ok(match prefix {
        Some(prefix) => format!("{prefix}{KEY_DELIMITER}{name}"),
        None => name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_upload_key() {
        let path = Path::new("/tmp/reports/q3.pdf");
        assert_eq!(default_upload_key(path, None).unwrap(), "q3.pdf");
        assert_eq!(default_upload_key(path, Some("")).unwrap(), "q3.pdf");
        assert_eq!(
            default_upload_key(path, Some("archive/2024/")).unwrap(),
            "archive/2024/q3.pdf"
        );
        assert!(default_upload_key(Path::new("/"), None).is_err());
    }
}
