//! # bucketview-service
//!
//! Namespace tree, traversal engine and transfer pipeline for Bucketview.
//!
//! A flat object listing is folded into a [`tree::NamespaceTree`]. The
//! [`traversal::TraversalEngine`] walks a selected node to download or
//! delete it, or uploads a single file, reporting through a
//! [`progress::ProgressTracker`]. [`session::BucketSession`] ties a store,
//! the tree and the engine together; [`worker::TransferWorker`] runs
//! operations on background tasks.
//!
//! Dependencies are injected at construction time via `Arc` references.

pub mod cancel;
pub mod listing;
pub mod progress;
pub mod session;
pub mod traversal;
pub mod tree;
pub mod worker;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use progress::{EventSink, FileProgress, ProgressTracker};
pub use session::BucketSession;
pub use traversal::{OperationScope, TraversalEngine, default_upload_key};
pub use tree::{FileNode, FolderNode, NamespaceTree, NodeRef, TreeNode, build_tree};
pub use worker::{TransferHandle, TransferRequest, TransferWorker};
