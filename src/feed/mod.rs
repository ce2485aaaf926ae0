//! Infinite feeds: lazily extended, page-by-page views over a query.
//!
//! An [`InfiniteFeed`] owns one pagination session. List views drive it
//! with "need more" signals and observe it through snapshots or an event
//! subscription; they never hold cursors themselves.
//!
//! # Example
//!
//! ```ignore
//! let feed = InfiniteFeed::new(
//!     QueryKey::new(["locations"]),
//!     Arc::new(client.locations()),
//!     FeedConfig::default(),
//! )?;
//! let events = feed.subscribe();
//!
//! feed.request_more();
//! loop {
//!     match events.recv() {
//!         Ok(FeedEvent::PageAppended { records, has_more, .. }) => {
//!             render(&records);
//!             if !has_more {
//!                 break;
//!             }
//!         }
//!         Ok(FeedEvent::Failed { error }) => show_retry(error),
//!         Ok(_) => {}
//!         Err(_) => break,
//!     }
//! }
//! ```

mod manager;
mod types;

pub use manager::InfiniteFeed;
pub use types::{
    DropReason, FeedConfig, FeedEvent, FeedHandle, FeedSnapshot, FeedState, QueryKey,
    SubscriptionId,
};
