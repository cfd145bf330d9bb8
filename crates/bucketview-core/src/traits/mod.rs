//! Collaborator traits defined in `bucketview-core` and implemented by
//! `bucketview-storage`.

pub mod filesystem;
pub mod storage;

pub use filesystem::{FileWriter, LocalFilesystem};
pub use storage::{ByteStream, ObjectStore};
