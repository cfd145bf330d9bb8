//! Object listing types produced by an object store.

use serde::{Deserialize, Serialize};

/// Key separator used by convention in object-storage namespaces.
pub const KEY_DELIMITER: char = '/';

/// One stored object as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key, `/`-delimited, without a leading `/`.
    pub key: String,
    /// Object size in bytes.
    pub size_bytes: u64,
}

impl ObjectEntry {
    /// Create a new listing entry.
    pub fn new(key: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            key: key.into(),
            size_bytes,
        }
    }

    /// Whether this entry is an explicit empty-folder marker (`photos/`).
    pub fn is_folder_marker(&self) -> bool {
        self.key.ends_with(KEY_DELIMITER)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    /// Entries on this page, in key order.
    pub entries: Vec<ObjectEntry>,
    /// Token to pass to the next `list_objects` call, if more pages exist.
    pub next_token: Option<String>,
}
