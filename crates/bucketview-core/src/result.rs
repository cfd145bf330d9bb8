//! Convenience result type alias for Bucketview.

use crate::error::AppError;

/// A specialized `Result` type for Bucketview operations.
pub type AppResult<T> = Result<T, AppError>;
