//! crates/dailystream_core/src/resolver.rs
//!
//! Backend query resolution: decides which upstream query a request maps to,
//! forwards it to the news provider, and reports failures as an HTTP status
//! plus a user-facing message.

use crate::domain::{
    Category, NewsPayload, NewsRequest, QueryParameters, QueryTarget, ResourceKey, DEFAULT_LANGUAGE,
};
use crate::ports::{NewsProvider, PortError};
use std::sync::Arc;
use tracing::{debug, warn};

pub const MISSING_KEY_MESSAGE: &str = "News API key is not configured";
pub const FALLBACK_FAILURE_MESSAGE: &str = "Failed to fetch news data";

const INTERNAL_SERVER_ERROR: u16 = 500;

/// Why a headline or search request could not be answered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No upstream credential is configured. Fatal for the request only.
    #[error("News API key is not configured")]
    MissingCredential,

    /// The provider failed; `status` mirrors its HTTP status when known.
    #[error("{}", .message.as_deref().unwrap_or(FALLBACK_FAILURE_MESSAGE))]
    Upstream {
        status: Option<u16>,
        message: Option<String>,
    },
}

impl ResolveError {
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::MissingCredential => INTERNAL_SERVER_ERROR,
            ResolveError::Upstream { status, .. } => status.unwrap_or(INTERNAL_SERVER_ERROR),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<PortError> for ResolveError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::Upstream { status, message } => ResolveError::Upstream { status, message },
            PortError::Storage(_) | PortError::Unexpected(_) => ResolveError::Upstream {
                status: None,
                message: None,
            },
        }
    }
}

//=========================================================================================
// Target Selection
//=========================================================================================

/// `/api/news`: an explicit category wins, then free text (passed through
/// unclassified), then the general category.
///
/// Category names in any case are sent in their canonical lowercase form;
/// anything else is sent as given.
pub fn headline_target(request: &NewsRequest) -> QueryTarget {
    if let Some(category) = request.category() {
        let category = Category::classify(category)
            .map(|known| known.as_str().to_string())
            .unwrap_or_else(|| category.to_string());
        return QueryTarget::Category(category);
    }
    match request.query() {
        Some(text) => QueryTarget::Text(text.to_string()),
        None => QueryTarget::general(),
    }
}

/// `/api/news/search`: the term is classified, so a term naming a category
/// becomes a category filter and can never match as full text.
pub fn search_target(request: &NewsRequest) -> QueryTarget {
    match request.query() {
        Some(term) => ResourceKey::classify(term).into(),
        None => QueryTarget::general(),
    }
}

//=========================================================================================
// QueryResolver
//=========================================================================================

/// Process-wide upstream settings, fixed once the server starts.
#[derive(Clone)]
pub struct ResolverSettings {
    pub api_key: Option<String>,
    pub language: String,
}

impl ResolverSettings {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.is_empty()),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Maps inbound requests onto the news provider.
#[derive(Clone)]
pub struct QueryResolver {
    provider: Arc<dyn NewsProvider>,
    settings: ResolverSettings,
}

impl QueryResolver {
    pub fn new(provider: Arc<dyn NewsProvider>, settings: ResolverSettings) -> Self {
        Self { provider, settings }
    }

    pub fn headline_parameters(&self, request: &NewsRequest) -> Result<QueryParameters, ResolveError> {
        self.parameters(headline_target(request), request)
    }

    pub fn search_parameters(&self, request: &NewsRequest) -> Result<QueryParameters, ResolveError> {
        self.parameters(search_target(request), request)
    }

    pub async fn headlines(&self, request: &NewsRequest) -> Result<NewsPayload, ResolveError> {
        let params = self.headline_parameters(request)?;
        self.forward(params).await
    }

    pub async fn search(&self, request: &NewsRequest) -> Result<NewsPayload, ResolveError> {
        let params = self.search_parameters(request)?;
        self.forward(params).await
    }

    fn parameters(
        &self,
        target: QueryTarget,
        request: &NewsRequest,
    ) -> Result<QueryParameters, ResolveError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ResolveError::MissingCredential)?;
        Ok(
            QueryParameters::new(api_key, self.settings.language.as_str(), target)
                .with_paging(request.page, request.page_size),
        )
    }

    async fn forward(&self, params: QueryParameters) -> Result<NewsPayload, ResolveError> {
        debug!(?params, "Forwarding query to news provider");
        self.provider.top_headlines(&params).await.map_err(|e| {
            warn!("Error fetching news: {}", e);
            ResolveError::from(e)
        })
    }
}
