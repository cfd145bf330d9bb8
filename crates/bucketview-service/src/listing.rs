//! Paginated listing helpers.

use tracing::debug;

use bucketview_core::result::AppResult;
use bucketview_core::traits::storage::ObjectStore;
use bucketview_core::types::ObjectEntry;

/// List every object under `prefix` (the whole bucket for `None`), following
/// continuation tokens until the last page.
pub async fn list_all(
    store: &dyn ObjectStore,
    prefix: Option<&str>,
) -> AppResult<Vec<ObjectEntry>> {
    let mut entries = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store.list_objects(prefix, token.as_deref()).await?;
        pages += 1;
        entries.extend(page.entries);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    debug!(
        bucket = store.bucket(),
        prefix = prefix.unwrap_or(""),
        pages,
        objects = entries.len(),
        "Listed objects"
    );
    Ok(entries)
}
