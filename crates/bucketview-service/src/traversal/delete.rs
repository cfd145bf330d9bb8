//! Recursive delete of a file or folder node.

use tracing::{debug, info};

use bucketview_core::events::{OperationKind, TransferEvent};
use bucketview_core::result::AppResult;
use bucketview_core::types::OperationSummary;

use super::{OperationScope, TraversalEngine};
use crate::tree::NodeRef;

impl TraversalEngine {
    /// Delete `node` from the store.
    ///
    /// A file deletes its own key. A folder deletes every object currently
    /// stored under its prefix, listed live from the store, so objects added
    /// after the tree was built are removed too.
    pub async fn delete(
        &self,
        node: NodeRef<'_>,
        scope: &OperationScope,
    ) -> AppResult<OperationSummary> {
        let mut summary = OperationSummary::new(OperationKind::Delete, node.full_key());
        match node {
            NodeRef::File(file) => self.delete_key(&file.full_key, scope, &mut summary).await?,
            NodeRef::Folder(folder) => {
                self.delete_prefix(&folder.key_prefix(), scope, &mut summary)
                    .await?
            }
        }

        info!(
            bucket = self.store.bucket(),
            target_key = %summary.target,
            deleted = summary.objects_succeeded,
            failed = summary.failures.len(),
            "Delete finished"
        );
        Ok(summary)
    }

    /// Delete every object whose key starts with `prefix`. An empty prefix
    /// empties the bucket.
    pub async fn delete_prefix(
        &self,
        prefix: &str,
        scope: &OperationScope,
        summary: &mut OperationSummary,
    ) -> AppResult<()> {
        let mut token: Option<String> = None;
        loop {
            let page = {
                let token = token.as_deref();
                self.with_retry(prefix, &scope.cancel, move || {
                    self.store.list_objects(Some(prefix), token)
                })
                .await?
            };

            for entry in &page.entries {
                scope.cancel.check()?;
                self.delete_key(&entry.key, scope, summary).await?;
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(())
    }

    async fn delete_key(
        &self,
        key: &str,
        scope: &OperationScope,
        summary: &mut OperationSummary,
    ) -> AppResult<()> {
        let store = &self.store;
        match self
            .with_retry(key, &scope.cancel, || store.delete_object(key))
            .await
        {
            Ok(()) => {
                summary.objects_succeeded += 1;
                scope.tracker.events().emit(TransferEvent::ObjectDeleted {
                    key: key.to_string(),
                });
                debug!(key, "Deleted object");
                Ok(())
            }
            Err(err) => self.record_failure(summary, key, err, &scope.tracker),
        }
    }
}
