//! # Scenes
//!
//! Keyset pagination over a document store, and infinite feeds built on it.
//!
//! ## Core Concepts
//!
//! - **Pages**: bounded, ordered result sets with an optional cursor
//! - **Cursors**: the key of the last record in a page; absent at end-of-stream
//! - **Adapters**: turn a cursor into an ordered store query and map documents into records
//! - **Feeds**: accumulate pages into one growing sequence, one fetch at a time
//!
//! ## Example
//!
//! ```ignore
//! use scenes::{Client, ClientConfig, DatabaseService, MemoryDocumentStore};
//!
//! let client = Client::new(ClientConfig::default(), Arc::new(MemoryDocumentStore::new()))?;
//!
//! let first = client.get_locations(None, None)?;
//! if let Some(cursor) = &first.next_cursor {
//!     let second = client.get_locations(Some(cursor), None)?;
//! }
//! ```

pub mod client;
pub mod documents;
pub mod error;
pub mod feed;
pub mod page;
pub mod records;
pub mod types;

// Re-exports
pub use client::{Client, ClientConfig, DatabaseService};
pub use documents::{DocumentStore, FieldValue, MemoryDocumentStore, PageQuery, RawDocument};
pub use error::{FeedError, Result};
pub use feed::{
    DropReason, FeedConfig, FeedEvent, FeedHandle, FeedSnapshot, FeedState, InfiniteFeed,
    QueryKey, SubscriptionId,
};
pub use page::{validate_page_size, Cursor, Page, PageSource, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use records::{FieldReader, Location, Record, RecordAdapter};
pub use types::*;
