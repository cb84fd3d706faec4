//! services/api/src/adapters/backend.rs
//!
//! The client-side adapter that talks to our own `/api/news` endpoints.
//! It implements the `NewsBackend` port from the `core` crate.

use async_trait::async_trait;
use dailystream_core::domain::{Feed, ResponseEnvelope};
use dailystream_core::ports::{NewsBackend, PortError, PortResult};
use reqwest::Client;

/// An adapter that implements the `NewsBackend` port over HTTP.
#[derive(Clone)]
pub struct HttpNewsBackend {
    client: Client,
    base_url: String,
}

impl HttpNewsBackend {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Pings `/api/wake` so a host that sleeps when idle starts spinning up.
    pub async fn wake(&self) -> PortResult<()> {
        let response = self
            .client
            .get(format!("{}/api/wake", self.base_url))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PortError::upstream(Some(response.status().as_u16()), None));
        }
        Ok(())
    }

    fn endpoint(&self, feed: &Feed) -> (String, &'static str) {
        match feed {
            Feed::Headlines(_) => (format!("{}/api/news", self.base_url), "category"),
            Feed::Search(_) => (format!("{}/api/news/search", self.base_url), "q"),
        }
    }
}

#[async_trait]
impl NewsBackend for HttpNewsBackend {
    async fn fetch_page(
        &self,
        feed: &Feed,
        page: u32,
        page_size: u32,
    ) -> PortResult<ResponseEnvelope> {
        let (url, key_param) = self.endpoint(feed);
        let query = [
            (key_param, feed.key().to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::upstream(Some(status.as_u16()), None));
        }

        response
            .json::<ResponseEnvelope>()
            .await
            .map_err(|e| PortError::Unexpected(format!("Invalid response envelope: {}", e)))
    }
}
