//! Feed session types: states, snapshots, events, and subscription handles.

use crate::error::FeedError;
use crate::page::{Page, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the logical query a feed pages through.
///
/// A different key means a different result set, so cursors from one key
/// are never replayed against another.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryKey(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Debug for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryKey({:?})", self.0)
    }
}

/// Feed configuration.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Records requested per fetch.
    /// Default: 20
    pub page_size: usize,

    /// Max buffered events before a subscriber is dropped.
    /// Default: 256
    pub buffer_size: usize,

    /// How close to the end of the loaded items the visible range must be
    /// before [`notify_visible`](super::InfiniteFeed::notify_visible)
    /// requests another page.
    /// Default: 10
    pub end_reached_threshold: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            buffer_size: 256,
            end_reached_threshold: DEFAULT_PAGE_SIZE / 2,
        }
    }
}

/// Where a feed session is in its fetch lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedState {
    /// Nothing fetched yet.
    Initial,
    /// A fetch is in flight.
    Fetching,
    /// At least one page fetched and a cursor to continue from.
    Ready,
    /// The last page had no cursor.
    Exhausted,
    /// The last fetch failed; cursor and pages are from before it.
    Errored,
}

/// Point-in-time view of a feed session.
#[derive(Clone, Debug)]
pub struct FeedSnapshot<T> {
    pub query_key: QueryKey,
    pub state: FeedState,
    /// Pages in fetch order.
    pub pages: Vec<Page<T>>,
    pub has_more: bool,
    pub is_fetching_more: bool,
    pub error: Option<FeedError>,
}

impl<T> FeedSnapshot<T> {
    /// All loaded records in fetch order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.data.iter())
    }

    /// Total loaded records.
    pub fn len(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetching the first page.
    pub fn is_loading(&self) -> bool {
        self.is_fetching_more && self.pages.is_empty()
    }
}

impl<T: Clone> FeedSnapshot<T> {
    /// Loaded records flattened into one vector.
    pub fn flattened(&self) -> Vec<T> {
        self.items().cloned().collect()
    }
}

/// Events emitted to feed subscribers.
#[derive(Clone, Debug)]
pub enum FeedEvent<T> {
    /// A page was appended to the aggregate.
    PageAppended {
        /// Zero-based index of the page within the session.
        page_index: usize,
        records: Vec<T>,
        has_more: bool,
    },

    /// A fetch failed; the session is now errored.
    Failed { error: FeedError },

    /// The session was cleared.
    Reset { query_key: QueryKey },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
    /// The feed was dropped.
    Closed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to receive feed events.
pub struct FeedHandle<T> {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<FeedEvent<T>>,
}

impl<T> FeedHandle<T> {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<FeedEvent<T>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<FeedEvent<T>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<FeedEvent<T>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Cursor;

    #[test]
    fn test_snapshot_flattening() {
        let snapshot = FeedSnapshot {
            query_key: QueryKey::new(["locations"]),
            state: FeedState::Ready,
            pages: vec![
                Page::new(vec![5, 4], Some(Cursor::new("4").unwrap())),
                Page::new(vec![3], None),
            ],
            has_more: true,
            is_fetching_more: false,
            error: None,
        };
        assert_eq!(snapshot.flattened(), vec![5, 4, 3]);
        assert_eq!(snapshot.len(), 3);
        assert!(!snapshot.is_loading());
    }

    #[test]
    fn test_query_key_equality() {
        assert_eq!(QueryKey::new(["locations"]), QueryKey::new(vec!["locations".to_string()]));
        assert_ne!(QueryKey::new(["locations"]), QueryKey::new(["locations", "park"]));
    }
}
