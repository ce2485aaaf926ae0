//! The consumed document store interface.

use super::value::RawDocument;
use crate::error::Result;
use crate::types::SortDirection;

/// An ordered, bounded query over one collection.
#[derive(Clone, Debug)]
pub struct PageQuery {
    /// Collection to read.
    pub collection: String,

    /// Field the results are ordered by. The document key breaks ties.
    pub order_field: String,

    /// Direction applied to both the order field and the key tiebreak.
    pub direction: SortDirection,

    /// Resolved anchor document; results start strictly after it.
    pub start_after: Option<RawDocument>,

    /// Maximum number of documents to return.
    pub limit: usize,
}

/// A keyed document database that can answer ordered page queries.
///
/// Implementations own transport, timeouts and retries; failures reach
/// callers as [`FeedError::Transport`](crate::FeedError::Transport).
pub trait DocumentStore: Send + Sync {
    /// Run one ordered page query.
    fn get_page(&self, query: &PageQuery) -> Result<Vec<RawDocument>>;

    /// Look up a document by key. `Ok(None)` when it does not exist.
    fn resolve_document(&self, collection: &str, key: &str) -> Result<Option<RawDocument>>;
}
