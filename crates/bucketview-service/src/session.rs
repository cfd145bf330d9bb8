//! Connected view of one bucket.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use bucketview_core::config::transfer::TransferConfig;
use bucketview_core::error::AppError;
use bucketview_core::result::AppResult;
use bucketview_core::traits::filesystem::LocalFilesystem;
use bucketview_core::traits::storage::ObjectStore;
use bucketview_core::types::OperationSummary;

use crate::traversal::{OperationScope, TraversalEngine, default_upload_key};
use crate::tree::{NamespaceTree, TreeNode};
use crate::worker::{TransferHandle, TransferRequest, TransferWorker};

/// A bucket connection holding the current tree.
///
/// The tree is rebuilt from a fresh listing on connect, on
/// [`BucketSession::refresh`], and after every upload or delete run through
/// the session.
pub struct BucketSession {
    engine: Arc<TraversalEngine>,
    worker: TransferWorker,
    tree: NamespaceTree,
}

impl std::fmt::Debug for BucketSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketSession")
            .field("bucket", &self.bucket())
            .field("object_count", &self.tree.object_count)
            .finish()
    }
}

impl BucketSession {
    /// Check the store is reachable, list the whole bucket and build the tree.
    pub async fn connect(
        store: Arc<dyn ObjectStore>,
        filesystem: Arc<dyn LocalFilesystem>,
        settings: TransferConfig,
    ) -> AppResult<Self> {
        store.health_check().await?;
        let tree = NamespaceTree::fetch(store.as_ref()).await?;

        info!(
            provider = store.provider_type(),
            bucket = store.bucket(),
            objects = tree.object_count,
            total = %tree.total_size_display(),
            "Connected to bucket"
        );

        let engine = Arc::new(TraversalEngine::new(store, filesystem, settings));
        Ok(Self {
            worker: TransferWorker::new(Arc::clone(&engine)),
            engine,
            tree,
        })
    }

    /// Re-list the bucket and rebuild the tree.
    pub async fn refresh(&mut self) -> AppResult<()> {
        self.tree = NamespaceTree::fetch(self.engine.store().as_ref()).await?;
        info!(
            bucket = self.bucket(),
            objects = self.tree.object_count,
            total = %self.tree.total_size_display(),
            "Refreshed bucket listing"
        );
        Ok(())
    }

    /// The current tree.
    pub fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        self.engine.store().bucket()
    }

    /// The traversal engine used by this session.
    pub fn engine(&self) -> &Arc<TraversalEngine> {
        &self.engine
    }

    /// Look up a node by path. A trailing `/` selects a folder.
    pub fn resolve(&self, path: &str) -> AppResult<TreeNode> {
        self.tree
            .resolve(path)
            .map(|node| node.to_owned_node())
            .ok_or_else(|| AppError::not_found(format!("No file or folder at '{path}'")))
    }

    /// Download the node at `path` into `destination`.
    pub async fn download(
        &self,
        path: &str,
        destination: &Path,
        scope: &OperationScope,
    ) -> AppResult<OperationSummary> {
        let node = self
            .tree
            .resolve(path)
            .ok_or_else(|| AppError::not_found(format!("No file or folder at '{path}'")))?;
        self.engine.download(node, destination, scope).await
    }

    /// Delete the node at `path`, then refresh the tree.
    pub async fn delete(
        &mut self,
        path: &str,
        scope: &OperationScope,
    ) -> AppResult<OperationSummary> {
        let node = self.resolve(path)?;
        let result = self.engine.delete(node.as_node_ref(), scope).await;
        self.refresh_after(result).await
    }

    /// Upload `source`, then refresh the tree. Without a key the file name
    /// is used.
    pub async fn upload(
        &mut self,
        source: &Path,
        key: Option<&str>,
        scope: &OperationScope,
    ) -> AppResult<OperationSummary> {
        let key = match key {
            Some(key) => key.to_string(),
            None => default_upload_key(source, None)?,
        };
        let result = self.engine.upload(source, &key, scope).await;
        self.refresh_after(result).await
    }

    /// Start a download on a background task.
    pub fn spawn_download(&self, path: &str, destination: &Path) -> AppResult<TransferHandle> {
        let node = self.resolve(path)?;
        Ok(self.worker.spawn(TransferRequest::Download {
            node,
            destination: destination.to_path_buf(),
        }))
    }

    /// Start a delete on a background task. Call [`BucketSession::refresh`]
    /// once it finishes.
    pub fn spawn_delete(&self, path: &str) -> AppResult<TransferHandle> {
        let node = self.resolve(path)?;
        Ok(self.worker.spawn(TransferRequest::Delete { node }))
    }

    /// Start an upload on a background task. Call [`BucketSession::refresh`]
    /// once it finishes.
    pub fn spawn_upload(&self, source: &Path, key: Option<&str>) -> AppResult<TransferHandle> {
        let key = match key {
            Some(key) => key.to_string(),
            None => default_upload_key(source, None)?,
        };
        Ok(self.worker.spawn(TransferRequest::Upload {
            source: source.to_path_buf(),
            key,
        }))
    }

    /// Refresh after a mutation; the bucket may have changed even if the
    /// operation failed part way.
    async fn refresh_after(
        &mut self,
        result: AppResult<OperationSummary>,
    ) -> AppResult<OperationSummary> {
        let refreshed = self.refresh().await;
        let summary = result?;
        refreshed?;
        Ok(summary)
    }
}
