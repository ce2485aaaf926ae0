//! The pagination contract shared by adapters and feeds.
//!
//! A [`Page`] is one bounded, ordered result set plus an optional
//! [`Cursor`]. The cursor is the key of the last record in the page and
//! only means something to the query that produced it. An absent cursor
//! means end-of-stream.

use crate::error::{FeedError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page a single fetch may request.
pub const MAX_PAGE_SIZE: usize = 500;

/// Longest key the document store accepts, in bytes.
const MAX_KEY_BYTES: usize = 1500;

/// Opaque token anchoring the next query after a specific record.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cursor(String);

impl Cursor {
    /// Parse a cursor supplied by a caller.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(FeedError::InvalidArgument("cursor must not be empty".into()));
        }
        if key.len() > MAX_KEY_BYTES {
            return Err(FeedError::InvalidArgument(format!(
                "cursor is {} bytes (max {})",
                key.len(),
                MAX_KEY_BYTES
            )));
        }
        if key.contains('/') {
            return Err(FeedError::InvalidArgument(format!(
                "cursor {:?} contains a path separator",
                key
            )));
        }
        Ok(Cursor(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cursor {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self> {
        Cursor::new(value)
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cursor({})", self.0)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bounded result set from a single query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        Self { data, next_cursor }
    }

    /// A final page with no records.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            next_cursor: None,
        }
    }

    /// Whether records may exist beyond this page.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Anything that can fetch one page of `T` after an optional cursor.
pub trait PageSource<T>: Send + Sync {
    fn fetch_page(&self, cursor: Option<&Cursor>, page_size: usize) -> Result<Page<T>>;

    /// Largest page size this source accepts, if it enforces one.
    fn max_page_size(&self) -> Option<usize> {
        None
    }
}

impl<T, F> PageSource<T> for F
where
    F: Fn(Option<&Cursor>, usize) -> Result<Page<T>> + Send + Sync,
{
    fn fetch_page(&self, cursor: Option<&Cursor>, page_size: usize) -> Result<Page<T>> {
        self(cursor, page_size)
    }
}

/// Check a requested page size against `max`.
pub fn validate_page_size(page_size: usize, max: usize) -> Result<usize> {
    if page_size == 0 {
        return Err(FeedError::InvalidArgument("page size must be positive".into()));
    }
    if page_size > max {
        return Err(FeedError::InvalidArgument(format!(
            "page size {} exceeds maximum of {}",
            page_size, max
        )));
    }
    Ok(page_size)
}
