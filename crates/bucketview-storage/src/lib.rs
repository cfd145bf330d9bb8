//! # bucketview-storage
//!
//! Collaborator implementations for Bucketview: S3-compatible object stores,
//! an in-memory object store, and tokio-backed local filesystem access.

pub mod local;
pub mod providers;

pub use local::TokioFilesystem;
pub use providers::{FaultOperation, MemoryObjectStore};
#[cfg(feature = "s3")]
pub use providers::S3ObjectStore;
