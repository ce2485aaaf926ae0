//! The infinite feed: one pagination session over a [`PageSource`].

use super::types::{
    DropReason, FeedConfig, FeedEvent, FeedHandle, FeedSnapshot, FeedState, QueryKey,
    SubscriptionId,
};
use crate::error::{FeedError, Result};
use crate::page::{validate_page_size, Cursor, Page, PageSource};
use crossbeam_channel::{bounded, Sender};
use parking_lot::{Condvar, Mutex, RwLock};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Mutable session state, guarded by one lock.
struct Session<T> {
    /// Bumped on every reset; completions carry the value they started with.
    generation: u64,
    query_key: QueryKey,
    pages: Vec<Page<T>>,
    /// Last good cursor. Only replaced by a successful fetch.
    cursor: Option<Cursor>,
    state: FeedState,
    error: Option<FeedError>,
    closed: bool,
}

impl<T> Session<T> {
    fn new(query_key: QueryKey) -> Self {
        Self {
            generation: 0,
            query_key,
            pages: Vec::new(),
            cursor: None,
            state: FeedState::Initial,
            error: None,
            closed: false,
        }
    }

    fn loaded(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }
}

/// A fetch that has been admitted by the state machine.
struct Ticket {
    generation: u64,
    cursor: Option<Cursor>,
}

/// What happened to a finished fetch.
enum Completion {
    Applied,
    Failed(FeedError),
    Stale,
}

struct Shared<T> {
    source: Arc<dyn PageSource<T>>,
    config: FeedConfig,
    session: Mutex<Session<T>>,
    /// Signalled whenever the session leaves `Fetching`.
    idle: Condvar,
    subscribers: RwLock<HashMap<SubscriptionId, Sender<FeedEvent<T>>>>,
    next_subscriber: AtomicU64,
}

impl<T: Clone + Send + 'static> Shared<T> {
    /// Admit a fetch unless one is in flight or the stream is exhausted.
    fn begin(&self) -> Option<Ticket> {
        let mut session = self.session.lock();
        if session.closed {
            return None;
        }
        match session.state {
            FeedState::Fetching | FeedState::Exhausted => {
                trace!(
                    query_key = ?session.query_key,
                    state = ?session.state,
                    "request for more suppressed"
                );
                None
            }
            FeedState::Initial | FeedState::Ready | FeedState::Errored => {
                session.state = FeedState::Fetching;
                debug!(
                    query_key = ?session.query_key,
                    generation = session.generation,
                    cursor = session.cursor.as_ref().map(Cursor::as_str),
                    "fetching next page"
                );
                Some(Ticket {
                    generation: session.generation,
                    cursor: session.cursor.clone(),
                })
            }
        }
    }

    /// Run the source. A panic inside it fails the fetch instead of
    /// leaving the session stuck in `Fetching`.
    fn fetch(&self, ticket: &Ticket) -> Result<Page<T>> {
        let cursor = ticket.cursor.as_ref();
        let page_size = self.config.page_size;
        panic::catch_unwind(AssertUnwindSafe(|| self.source.fetch_page(cursor, page_size)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(panic = %message, "page source panicked");
                Err(FeedError::Transport(format!("page source panicked: {}", message)))
            })
    }

    /// Apply a finished fetch to the session it was started for.
    fn complete(&self, generation: u64, result: Result<Page<T>>) -> Completion {
        let mut session = self.session.lock();
        if session.closed || session.generation != generation {
            debug!(
                started = generation,
                current = session.generation,
                "discarding stale page"
            );
            return Completion::Stale;
        }

        let completion = match result {
            Ok(page) => {
                let page_index = session.pages.len();
                let has_more = page.has_more();
                session.cursor = page.next_cursor.clone();
                session.state = if has_more {
                    FeedState::Ready
                } else {
                    FeedState::Exhausted
                };
                session.error = None;
                let records = page.data.clone();
                session.pages.push(page);
                debug!(
                    query_key = ?session.query_key,
                    page_index,
                    returned = records.len(),
                    has_more,
                    "page appended"
                );
                self.broadcast(FeedEvent::PageAppended {
                    page_index,
                    records,
                    has_more,
                });
                Completion::Applied
            }
            Err(error) => {
                warn!(query_key = ?session.query_key, %error, "page fetch failed");
                session.state = FeedState::Errored;
                session.error = Some(error.clone());
                self.broadcast(FeedEvent::Failed {
                    error: error.clone(),
                });
                Completion::Failed(error)
            }
        };

        self.idle.notify_all();
        completion
    }

    /// Send an event to every subscriber. Drops subscribers that fail to receive.
    fn broadcast(&self, event: FeedEvent<T>) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscribers.read();
            for (id, sender) in subs.iter() {
                if sender.try_send(event.clone()).is_err() {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscribers.write();
            for id in to_remove {
                if let Some(sender) = subs.remove(&id) {
                    debug!(subscription = id.0, "dropping slow feed subscriber");
                    let _ = sender.try_send(FeedEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

/// Accumulates pages from a [`PageSource`] into one growing sequence.
///
/// At most one fetch is in flight per session. Requests made while
/// fetching or after the stream is exhausted are dropped, not queued.
/// A failed fetch leaves the pages and cursor untouched so the next
/// request resumes where the last good page ended. Resetting (or
/// dropping) the feed discards whatever is still in flight.
///
/// # Example
///
/// ```ignore
/// let feed = InfiniteFeed::new(
///     QueryKey::new(["locations"]),
///     Arc::new(client.locations()),
///     FeedConfig::default(),
/// )?;
///
/// feed.request_more();
/// feed.wait_idle(Duration::from_secs(5));
/// for location in feed.snapshot().items() {
///     println!("{}", location.name);
/// }
/// ```
pub struct InfiniteFeed<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> InfiniteFeed<T> {
    /// Fails with `InvalidArgument` when `config.page_size` is zero or
    /// above the source's [`max_page_size`](PageSource::max_page_size).
    pub fn new(
        query_key: QueryKey,
        source: Arc<dyn PageSource<T>>,
        config: FeedConfig,
    ) -> Result<Self> {
        if config.page_size == 0 {
            return Err(FeedError::InvalidArgument("page size must be positive".into()));
        }
        if let Some(max) = source.max_page_size() {
            validate_page_size(config.page_size, max)?;
        }
        if config.buffer_size == 0 {
            return Err(FeedError::InvalidArgument("buffer size must be positive".into()));
        }

        Ok(Self {
            shared: Arc::new(Shared {
                source,
                config,
                session: Mutex::new(Session::new(query_key)),
                idle: Condvar::new(),
                subscribers: RwLock::new(HashMap::new()),
                next_subscriber: AtomicU64::new(1),
            }),
        })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.shared.config
    }

    // --- Fetching ---

    /// Start fetching the next page on a background thread.
    ///
    /// Returns `false` when the request was dropped because a fetch is
    /// already in flight or the stream is exhausted.
    pub fn request_more(&self) -> bool {
        let Some(ticket) = self.shared.begin() else {
            return false;
        };
        let generation = ticket.generation;

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("feed-fetch".to_string())
            .spawn(move || {
                let result = shared.fetch(&ticket);
                shared.complete(ticket.generation, result);
            });

        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn fetch thread");
            self.shared.complete(
                generation,
                Err(FeedError::Transport(format!("failed to spawn fetch: {}", e))),
            );
        }
        true
    }

    /// Fetch the next page on the calling thread.
    ///
    /// `Ok(true)` when a page was appended, `Ok(false)` when the request
    /// was dropped or its result went stale, `Err` when the fetch failed.
    pub fn load_more(&self) -> Result<bool> {
        let Some(ticket) = self.shared.begin() else {
            return Ok(false);
        };
        let result = self.shared.fetch(&ticket);
        match self.shared.complete(ticket.generation, result) {
            Completion::Applied => Ok(true),
            Completion::Failed(error) => Err(error),
            Completion::Stale => Ok(false),
        }
    }

    /// End-of-list signal from a list view.
    ///
    /// Requests another page when no more than
    /// [`FeedConfig::end_reached_threshold`] loaded items remain after
    /// `last_visible_index`. Errored sessions are left alone; retrying is
    /// an explicit [`request_more`](Self::request_more).
    pub fn notify_visible(&self, last_visible_index: usize) -> bool {
        {
            let session = self.shared.session.lock();
            if session.state != FeedState::Initial && session.state != FeedState::Ready {
                return false;
            }
            let remaining = session.loaded().saturating_sub(last_visible_index.saturating_add(1));
            if remaining > self.shared.config.end_reached_threshold {
                return false;
            }
        }
        self.request_more()
    }

    /// Block until no fetch is in flight. Returns `false` on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut session = self.shared.session.lock();
        while session.state == FeedState::Fetching {
            if self.shared.idle.wait_until(&mut session, deadline).timed_out() {
                return session.state != FeedState::Fetching;
            }
        }
        true
    }

    // --- Session identity ---

    /// Discard all pages and the cursor, keeping the query key.
    pub fn reset(&self) {
        let key = self.shared.session.lock().query_key.clone();
        self.reset_to(key);
    }

    /// Switch to another query. Resets only if the key differs.
    pub fn set_query_key(&self, query_key: QueryKey) -> bool {
        if self.shared.session.lock().query_key == query_key {
            return false;
        }
        self.reset_to(query_key);
        true
    }

    fn reset_to(&self, query_key: QueryKey) {
        let mut session = self.shared.session.lock();
        session.generation += 1;
        session.query_key = query_key.clone();
        session.pages.clear();
        session.cursor = None;
        session.state = FeedState::Initial;
        session.error = None;
        debug!(query_key = ?query_key, generation = session.generation, "feed reset");
        self.shared.broadcast(FeedEvent::Reset { query_key });
        self.shared.idle.notify_all();
    }

    // --- Observation ---

    pub fn snapshot(&self) -> FeedSnapshot<T> {
        let session = self.shared.session.lock();
        FeedSnapshot {
            query_key: session.query_key.clone(),
            state: session.state,
            pages: session.pages.clone(),
            has_more: session.state != FeedState::Exhausted,
            is_fetching_more: session.state == FeedState::Fetching,
            error: session.error.clone(),
        }
    }

    pub fn state(&self) -> FeedState {
        self.shared.session.lock().state
    }

    pub fn has_more(&self) -> bool {
        self.state() != FeedState::Exhausted
    }

    pub fn is_fetching_more(&self) -> bool {
        self.state() == FeedState::Fetching
    }

    pub fn error(&self) -> Option<FeedError> {
        self.shared.session.lock().error.clone()
    }

    /// Number of records loaded so far.
    pub fn len(&self) -> usize {
        self.shared.session.lock().loaded()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- Subscriptions ---

    /// Subscribe to session events from now on.
    pub fn subscribe(&self) -> FeedHandle<T> {
        let id = SubscriptionId(self.shared.next_subscriber.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(self.shared.config.buffer_size);
        self.shared.subscribers.write().insert(id, sender);
        FeedHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(sender) = self.shared.subscribers.write().remove(&id) {
            let _ = sender.try_send(FeedEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.shared.subscribers.read().len()
    }
}

impl<T> Drop for InfiniteFeed<T> {
    fn drop(&mut self) {
        {
            let mut session = self.shared.session.lock();
            session.closed = true;
            session.generation += 1;
        }
        self.shared.idle.notify_all();

        for (_, sender) in self.shared.subscribers.write().drain() {
            let _ = sender.try_send(FeedEvent::Dropped {
                reason: DropReason::Closed,
            });
        }
    }
}
