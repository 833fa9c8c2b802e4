use super::store::{Document, DocumentStore, StoreError};
use crate::filter::{FilterPredicate, SortSpec};

/// One page of documents plus the number of documents matching the filter.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Document>,
    pub total: u64,
}

/// Run the count and the bounded fetch for one listing.
///
/// Both see the same predicate but are separate reads without a shared
/// transaction, so `total` can drift from the fetched page under concurrent
/// writes. Errors are returned as-is; nothing is retried.
pub async fn execute(
    store: &dyn DocumentStore,
    collection: &str,
    predicate: &FilterPredicate,
    sort: &SortSpec,
    skip: u64,
    limit: u64,
) -> Result<Page, StoreError> {
    let (total, items) = futures::try_join!(
        store.count(collection, predicate),
        store.find(collection, predicate, sort, skip, limit),
    )?;

    tracing::debug!(
        collection,
        total,
        returned = items.len(),
        skip,
        limit,
        "listing executed"
    );

    Ok(Page { items, total })
}
