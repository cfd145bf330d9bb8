//! Hierarchical view over a flat object namespace.

mod builder;
mod node;

use serde::Serialize;

use bucketview_core::result::AppResult;
use bucketview_core::traits::storage::ObjectStore;
use bucketview_core::types::{ObjectEntry, format_megabytes};

use crate::listing::list_all;

pub use builder::{TreeBuilder, build_tree};
pub use node::{FileNode, FolderNode, NodeRef, TreeNode};

/// A bucket listing folded into a tree, with listing totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceTree {
    /// The root folder.
    pub root: FolderNode,
    /// Number of objects in the listing, folder markers included.
    pub object_count: usize,
}

impl NamespaceTree {
    /// Fold a complete listing into a tree.
    pub fn from_entries(entries: &[ObjectEntry]) -> Self {
        Self {
            root: build_tree(entries),
            object_count: entries.iter().filter(|e| !e.key.is_empty()).count(),
        }
    }

    /// List every object in the store and build the tree.
    pub async fn fetch(store: &dyn ObjectStore) -> AppResult<Self> {
        let entries = list_all(store, None).await?;
        Ok(Self::from_entries(&entries))
    }

    /// Sum of all object sizes.
    pub fn total_size_bytes(&self) -> u64 {
        self.root.aggregate_size_bytes
    }

    /// Total size rendered in megabytes, e.g. `12.50 MB`.
    pub fn total_size_display(&self) -> String {
        format_megabytes(self.total_size_bytes())
    }

    /// Resolve a path to a node; see [`FolderNode::resolve`].
    pub fn resolve(&self, path: &str) -> Option<NodeRef<'_>> {
        self.root.resolve(path)
    }
}
