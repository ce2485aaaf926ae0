//! Client handle tying configuration to a document store.

use crate::documents::DocumentStore;
use crate::error::{FeedError, Result};
use crate::page::{validate_page_size, Cursor, Page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::records::{Location, Record, RecordAdapter};
use serde::Deserialize;
use std::sync::Arc;

/// Client configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Project the store belongs to.
    pub project_id: String,

    /// Page size used when a caller does not give one.
    pub default_page_size: usize,

    /// Largest page a single fetch may request.
    pub max_page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Parse a JSON configuration object; missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(FeedError::Config("maxPageSize must be positive".into()));
        }
        validate_page_size(self.default_page_size, self.max_page_size)
            .map_err(|e| FeedError::Config(format!("defaultPageSize: {}", e)))?;
        Ok(())
    }
}

struct ClientInner {
    config: ClientConfig,
    store: Arc<dyn DocumentStore>,
}

/// Explicit handle to the document store.
///
/// Build one per process and clone it wherever an adapter is needed.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    pub fn new(config: ClientConfig, store: Arc<dyn DocumentStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(ClientInner { config, store }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Adapter for any record type.
    pub fn records<R: Record>(&self) -> RecordAdapter<R> {
        RecordAdapter::new(self.clone())
    }

    pub fn locations(&self) -> RecordAdapter<Location> {
        self.records()
    }
}

/// Read API consumed by screens.
pub trait DatabaseService: Send + Sync {
    /// Newest locations first. `limit = None` uses the configured default.
    fn get_locations(
        &self,
        cursor: Option<&Cursor>,
        limit: Option<usize>,
    ) -> Result<Page<Location>>;
}

impl DatabaseService for Client {
    fn get_locations(
        &self,
        cursor: Option<&Cursor>,
        limit: Option<usize>,
    ) -> Result<Page<Location>> {
        let limit = limit.unwrap_or(self.config().default_page_size);
        self.locations().fetch_page(cursor, limit)
    }
}
