//! # bucketview-core
//!
//! Core crate for Bucketview. Contains the collaborator traits (object store,
//! local filesystem), configuration schemas, object listing types, transfer
//! events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Bucketview crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
