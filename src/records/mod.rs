//! Typed records and the adapter that pages them out of the store.

mod adapter;
mod fields;
mod location;

pub use adapter::RecordAdapter;
pub use fields::FieldReader;
pub use location::Location;

use crate::documents::RawDocument;
use crate::error::Result;

/// A record type stored in one collection and paged by one field.
pub trait Record: Sized + Send + Sync + 'static {
    /// Collection holding the records.
    const COLLECTION: &'static str;

    /// Timestamp field the records are ordered by.
    const ORDER_FIELD: &'static str;

    /// The store-assigned unique key.
    fn key(&self) -> &str;

    /// Map a raw document. Fails with
    /// [`FeedError::DataIntegrity`](crate::FeedError::DataIntegrity) on a
    /// malformed document.
    fn from_document(doc: &RawDocument) -> Result<Self>;
}
