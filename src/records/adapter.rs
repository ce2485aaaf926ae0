//! The record store adapter.
//!
//! Turns "give me the next page after this cursor" into one ordered query
//! against the document store (plus a lookup to resolve the cursor), maps
//! every returned document, and derives the next cursor.

use super::Record;
use crate::client::Client;
use crate::documents::{PageQuery, RawDocument};
use crate::error::{FeedError, Result};
use crate::page::{validate_page_size, Cursor, Page, PageSource};
use crate::types::SortDirection;
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Fetches pages of `R`, newest first.
pub struct RecordAdapter<R> {
    client: Client,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RecordAdapter<R> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    /// Fetch one page ordered by `R::ORDER_FIELD` descending.
    ///
    /// `next_cursor` is set iff the page came back full. A page that
    /// exactly exhausts the collection therefore still reports more, and
    /// the following fetch returns an empty final page.
    pub fn fetch_page(&self, cursor: Option<&Cursor>, page_size: usize) -> Result<Page<R>> {
        let limit = validate_page_size(page_size, self.client.config().max_page_size)?;

        let start_after = match cursor {
            Some(cursor) => Some(self.resolve_anchor(cursor)?),
            None => None,
        };

        let query = PageQuery {
            collection: R::COLLECTION.to_string(),
            order_field: R::ORDER_FIELD.to_string(),
            direction: SortDirection::Descending,
            start_after,
            limit,
        };

        let mut documents = self.client.store().get_page(&query)?;
        if documents.len() > limit {
            warn!(
                collection = R::COLLECTION,
                returned = documents.len(),
                limit,
                "store returned more documents than requested, truncating"
            );
            documents.truncate(limit);
        }

        let data = documents
            .iter()
            .map(R::from_document)
            .collect::<Result<Vec<_>>>()?;

        let next_cursor = if data.len() == limit {
            data.last().map(next_cursor_for).transpose()?
        } else {
            None
        };

        debug!(
            collection = R::COLLECTION,
            cursor = cursor.map(Cursor::as_str),
            limit,
            returned = data.len(),
            next_cursor = next_cursor.as_ref().map(Cursor::as_str),
            "fetched page"
        );

        Ok(Page { data, next_cursor })
    }

    /// First page with the configured default size.
    pub fn first_page(&self) -> Result<Page<R>> {
        self.fetch_page(None, self.client.config().default_page_size)
    }

    fn resolve_anchor(&self, cursor: &Cursor) -> Result<RawDocument> {
        self.client
            .store()
            .resolve_document(R::COLLECTION, cursor.as_str())?
            .ok_or_else(|| {
                debug!(
                    collection = R::COLLECTION,
                    cursor = cursor.as_str(),
                    "cursor no longer resolves"
                );
                FeedError::NotFound {
                    collection: R::COLLECTION.to_string(),
                    key: cursor.as_str().to_string(),
                }
            })
    }
}

/// Cursor anchored on `record`. Stored keys that cannot travel as a
/// cursor fail with `DataIntegrity`.
fn next_cursor_for<R: Record>(record: &R) -> Result<Cursor> {
    Cursor::new(record.key()).map_err(|err| {
        let reason = match err {
            FeedError::InvalidArgument(reason) => reason,
            other => other.to_string(),
        };
        FeedError::data_integrity(record.key(), format!("key unusable as cursor: {}", reason))
    })
}

impl<R> Clone for RecordAdapter<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> PageSource<R> for RecordAdapter<R> {
    fn fetch_page(&self, cursor: Option<&Cursor>, page_size: usize) -> Result<Page<R>> {
        RecordAdapter::fetch_page(self, cursor, page_size)
    }

    fn max_page_size(&self) -> Option<usize> {
        Some(self.client.config().max_page_size)
    }
}
