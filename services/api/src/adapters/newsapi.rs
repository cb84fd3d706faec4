//! services/api/src/adapters/newsapi.rs
//!
//! This module contains the adapter for the newsapi.org headlines service.
//! It implements the `NewsProvider` port from the `core` crate.

use async_trait::async_trait;
use dailystream_core::domain::{NewsPayload, QueryParameters};
use dailystream_core::ports::{NewsProvider, PortError, PortResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `NewsProvider` port against newsapi.org.
#[derive(Clone)]
pub struct NewsApiAdapter {
    client: Client,
    base_url: String,
}

impl NewsApiAdapter {
    /// Creates a new `NewsApiAdapter`. `base_url` is the API root, e.g.
    /// `https://newsapi.org/v2`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Builds the HTTP client with the configured request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dailystream/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::new(client, base_url))
    }
}

/// The part of a provider error body we surface to our own callers.
#[derive(Deserialize)]
struct ProviderFailure {
    message: Option<String>,
}

//=========================================================================================
// `NewsProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl NewsProvider for NewsApiAdapter {
    async fn top_headlines(&self, params: &QueryParameters) -> PortResult<NewsPayload> {
        let url = format!("{}/top-headlines", self.base_url);

        // The request URL carries the API key, so it is stripped from any error we log.
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!("News provider unreachable: {}", e);
                PortError::upstream(e.status().map(|s| s.as_u16()), None)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProviderFailure>()
                .await
                .ok()
                .and_then(|body| body.message);
            return Err(PortError::upstream(Some(status.as_u16()), message));
        }

        response.json::<NewsPayload>().await.map_err(|e| {
            PortError::Unexpected(format!(
                "Invalid payload from news provider: {}",
                e.without_url()
            ))
        })
    }
}
