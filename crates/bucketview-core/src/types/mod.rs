//! Shared value types: object listings, operation summaries and size units.

pub mod object;
pub mod size;
pub mod summary;

pub use object::{KEY_DELIMITER, ListPage, ObjectEntry};
pub use size::{bytes_to_megabytes, format_bytes, format_megabytes};
pub use summary::{ObjectFailure, OperationSummary};
