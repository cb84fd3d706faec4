//! crates/dailystream_core/src/fetcher.rs
//!
//! Client-side page fetching with a five minute first-page cache kept in a
//! browser-style key-value store.

use crate::domain::{Feed, NewsPayload};
use crate::ports::{Clock, KeyValueStore, NewsBackend, PortError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// How long a cached first page is served without asking the backend.
pub const CACHE_TTL_MILLIS: i64 = 5 * 60 * 1000;

/// A cached first page, stored as JSON under `Feed::cache_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: i64,
    pub data: NewsPayload,
}

impl CacheEntry {
    /// An entry stamped in the future, or so far in the past that its age
    /// does not fit in an `i64`, is never fresh.
    pub fn is_fresh(&self, now_millis: i64, ttl_millis: i64) -> bool {
        now_millis
            .checked_sub(self.timestamp)
            .is_some_and(|age| (0..ttl_millis).contains(&age))
    }
}

/// A headline page that could not be loaded. Search never produces one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error! Status: {0}")]
    Status(u16),
    #[error("API returned unsuccessful response: {0}")]
    Unsuccessful(String),
    #[error("Request failed: {0}")]
    Transport(String),
}

impl From<PortError> for FetchError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Upstream {
                status: Some(status),
                ..
            } => FetchError::Status(status),
            other => FetchError::Transport(other.to_string()),
        }
    }
}

/// Serves feed pages, going to the backend only when the cache cannot answer.
#[derive(Clone)]
pub struct PaginatedCacheFetcher {
    backend: Arc<dyn NewsBackend>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
}

impl PaginatedCacheFetcher {
    pub fn new(
        backend: Arc<dyn NewsBackend>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            store,
            clock,
            ttl_millis: CACHE_TTL_MILLIS,
        }
    }

    pub fn with_ttl_millis(mut self, ttl_millis: i64) -> Self {
        self.ttl_millis = ttl_millis;
        self
    }

    /// Fetches one page of `feed`.
    ///
    /// Headline failures are returned as errors so the caller can show them.
    /// Search failures come back as an empty payload.
    pub async fn fetch(
        &self,
        feed: &Feed,
        page: u32,
        page_size: u32,
    ) -> Result<NewsPayload, FetchError> {
        match feed {
            Feed::Headlines(_) => self.load(feed, page, page_size).await,
            Feed::Search(_) => Ok(self.search_page(feed, page, page_size).await),
        }
    }

    pub async fn top_headlines(
        &self,
        category: &str,
        page: u32,
        page_size: u32,
    ) -> Result<NewsPayload, FetchError> {
        self.fetch(&Feed::headlines(category), page, page_size).await
    }

    pub async fn search(&self, query: &str, page: u32, page_size: u32) -> NewsPayload {
        match Feed::search(query) {
            Some(feed) => self.search_page(&feed, page, page_size).await,
            None => NewsPayload::empty(),
        }
    }

    /// A failed search reads as "no results".
    async fn search_page(&self, feed: &Feed, page: u32, page_size: u32) -> NewsPayload {
        self.load(feed, page, page_size).await.unwrap_or_else(|e| {
            debug!(%feed, page, "Search failed, reporting no results: {}", e);
            NewsPayload::empty()
        })
    }

    async fn load(&self, feed: &Feed, page: u32, page_size: u32) -> Result<NewsPayload, FetchError> {
        let cache_key = feed.cache_key();

        if page == 1 {
            if let Some(entry) = self.cached(&cache_key) {
                debug!(%feed, "Using cached first page");
                return Ok(entry.data);
            }
        }

        let envelope = self.backend.fetch_page(feed, page, page_size).await?;
        let data = envelope.into_result().map_err(FetchError::Unsuccessful)?;

        if page == 1 {
            self.remember(&cache_key, &data);
        }
        Ok(data)
    }

    /// A stored entry that is missing, unreadable or expired is a miss.
    fn cached(&self, cache_key: &str) -> Option<CacheEntry> {
        let raw = match self.store.get(cache_key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(cache_key, "Cache read failed: {}", e);
                return None;
            }
        };
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(cache_key, "Ignoring malformed cache entry: {}", e);
                return None;
            }
        };
        entry
            .is_fresh(self.clock.now_millis(), self.ttl_millis)
            .then_some(entry)
    }

    fn remember(&self, cache_key: &str, data: &NewsPayload) {
        let entry = CacheEntry {
            timestamp: self.clock.now_millis(),
            data: data.clone(),
        };
        let result = serde_json::to_string(&entry)
            .map_err(|e| PortError::Storage(e.to_string()))
            .and_then(|raw| self.store.set(cache_key, &raw));
        if let Err(e) = result {
            warn!(cache_key, "Failed to cache first page: {}", e);
        }
    }
}
