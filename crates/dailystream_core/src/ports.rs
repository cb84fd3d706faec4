//! crates/dailystream_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core logic talks through.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! resolver, the fetcher and the feed controller independent of HTTP clients,
//! browser-style storage and wall clocks.

use crate::domain::{Feed, NewsPayload, QueryParameters, ResponseEnvelope};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// A remote service answered with a failure or could not be reached.
    /// `status` is the HTTP status when one was received.
    #[error("Upstream request failed (status: {status:?}): {}", .message.as_deref().unwrap_or("no message"))]
    Upstream {
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    pub fn upstream(status: Option<u16>, message: Option<String>) -> Self {
        PortError::Upstream { status, message }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The third-party headlines provider the backend proxies to.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Issues one `top-headlines` query and returns the provider's payload untouched.
    async fn top_headlines(&self, params: &QueryParameters) -> PortResult<NewsPayload>;
}

/// The client's view of our own backend.
#[async_trait]
pub trait NewsBackend: Send + Sync {
    /// Requests one page of a feed. Non-2xx answers come back as
    /// `PortError::Upstream` carrying the status.
    async fn fetch_page(&self, feed: &Feed, page: u32, page_size: u32)
        -> PortResult<ResponseEnvelope>;
}

/// Browser-style string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PortResult<()>;

    fn delete(&self, key: &str) -> PortResult<()>;
}

/// Source of "now" for cache timestamps.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}
