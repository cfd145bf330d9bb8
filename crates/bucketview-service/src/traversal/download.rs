//! Recursive download of a file or folder node.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use bucketview_core::error::{AppError, ErrorKind};
use bucketview_core::events::OperationKind;
use bucketview_core::result::AppResult;
use bucketview_core::types::{OperationSummary, format_megabytes};

use super::{OperationScope, TraversalEngine, safe_component};
use crate::cancel::CancelSignal;
use crate::progress::FileProgress;
use crate::tree::{FileNode, NodeRef};

impl TraversalEngine {
    /// Download `node` below `destination`.
    ///
    /// A file is written to `destination/<name>`. A folder is recreated as
    /// `destination/<name>` with its whole subtree in tree order; the root
    /// folder is mirrored directly into `destination`.
    pub async fn download(
        &self,
        node: NodeRef<'_>,
        destination: &Path,
        scope: &OperationScope,
    ) -> AppResult<OperationSummary> {
        let mut summary = OperationSummary::new(OperationKind::Download, node.full_key());
        self.filesystem.create_dir_all(destination).await?;

        // Explicit stack instead of recursion; children are pushed in
        // reverse so they pop in tree order.
        let mut pending: Vec<(NodeRef<'_>, PathBuf)> = vec![(node, destination.to_path_buf())];

        while let Some((current, parent_dir)) = pending.pop() {
            scope.cancel.check()?;
            match current {
                NodeRef::File(file) => {
                    match self.download_file_into(file, &parent_dir, scope).await {
                        Ok(bytes) => {
                            summary.objects_succeeded += 1;
                            summary.bytes_transferred += bytes;
                        }
                        Err(err) => {
                            self.record_failure(&mut summary, &file.full_key, err, &scope.tracker)?
                        }
                    }
                }
                NodeRef::Folder(folder) => {
                    let dir = if folder.is_root() {
                        Ok(parent_dir)
                    } else {
                        self.ensure_dir(&folder.name, &parent_dir).await
                    };
                    match dir {
                        Ok(dir) => {
                            let children: Vec<_> = folder.children().collect();
                            for child in children.into_iter().rev() {
                                pending.push((child, dir.clone()));
                            }
                        }
                        // The subtree is skipped.
                        Err(err) => {
                            self.record_failure(&mut summary, &folder.full_key, err, &scope.tracker)?
                        }
                    }
                }
            }
        }

        info!(
            target_key = %summary.target,
            destination = %destination.display(),
            files = summary.objects_succeeded,
            failed = summary.failures.len(),
            total = %format_megabytes(summary.bytes_transferred),
            "Download finished"
        );
        Ok(summary)
    }

    async fn download_file_into(
        &self,
        file: &FileNode,
        dir: &Path,
        scope: &OperationScope,
    ) -> AppResult<u64> {
        let path = dir.join(safe_component(&file.name)?);
        self.download_file(&file.full_key, &path, scope).await
    }

    async fn ensure_dir(&self, name: &str, parent: &Path) -> AppResult<PathBuf> {
        let dir = parent.join(safe_component(name)?);
        self.filesystem.create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Download one object to `path` and return the bytes written.
    async fn download_file(
        &self,
        key: &str,
        path: &Path,
        scope: &OperationScope,
    ) -> AppResult<u64> {
        let store = &self.store;
        let size = self
            .with_retry(key, &scope.cancel, || store.head_object(key))
            .await?;
        let progress = scope.tracker.start_file(key, size);

        let mut attempt = 1;
        loop {
            scope.cancel.check()?;
            match self.download_attempt(key, path, &progress, &scope.cancel).await {
                Ok(()) => break,
                Err(err) => {
                    self.before_retry(key, attempt, err, &scope.cancel).await?;
                    progress.restart_attempt();
                    attempt += 1;
                }
            }
        }

        let bytes = progress.complete();
        debug!(key, path = %path.display(), bytes, attempts = attempt, "Downloaded object");
        Ok(bytes)
    }

    async fn download_attempt(
        &self,
        key: &str,
        path: &Path,
        progress: &FileProgress,
        cancel: &CancelSignal,
    ) -> AppResult<()> {
        let mut body = self.store.get_object(key).await?;
        let mut writer = self.filesystem.create_file(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            cancel.check()?;
            let chunk = chunk.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Transfer,
                    format!("Download stream failed for '{key}'"),
                    e,
                )
            })?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| write_error(path, e))?;
            written += chunk.len() as u64;
            progress.advance(chunk.len() as u64);
        }

        writer.shutdown().await.map_err(|e| write_error(path, e))?;

        let expected = progress.expected_bytes();
        if written != expected {
            return Err(AppError::transfer(format!(
                "Download of '{key}' received {written} of {expected} bytes"
            )));
        }
        Ok(())
    }
}

fn write_error(path: &Path, e: std::io::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Filesystem,
        format!("Failed to write {}", path.display()),
        e,
    )
}
