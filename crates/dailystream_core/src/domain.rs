//! crates/dailystream_core/src/domain.rs
//!
//! Defines the core data structures shared by the backend and the client side:
//! categories, resource keys, upstream query parameters, the upstream payload
//! and the envelope our own endpoints answer with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Language requested from the upstream provider.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Shown when an article carries no image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/600x400?text=No+Image";

/// Source label used when the upstream leaves `source.name` empty.
pub const DEFAULT_SOURCE_NAME: &str = "News";

//=========================================================================================
// Categories and Resource Keys
//=========================================================================================

/// One of the fixed topic filters understood by the upstream provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    /// Case-insensitive lookup. Surrounding whitespace is significant.
    pub fn classify(value: &str) -> Option<Category> {
        let lowered = value.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a known news category")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::classify(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// The logical identity of a query: a known category or free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Category(Category),
    SearchTerm(String),
}

impl ResourceKey {
    /// A term is a category iff its lowercase form names one; otherwise it is
    /// kept verbatim as a search term.
    pub fn classify(term: &str) -> Self {
        match Category::classify(term) {
            Some(category) => ResourceKey::Category(category),
            None => ResourceKey::SearchTerm(term.to_string()),
        }
    }
}

//=========================================================================================
// Client Feeds
//=========================================================================================

/// The two paginated views the client renders. Both share one algorithm but
/// keep separate cache namespaces and backend endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Feed {
    /// Top headlines for a category, as named in the client route.
    Headlines(String),
    /// Results for a user-entered search term.
    Search(String),
}

impl Feed {
    pub fn headlines(category: impl Into<String>) -> Self {
        Feed::Headlines(category.into())
    }

    /// Blank search terms never reach the backend.
    pub fn search(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            None
        } else {
            Some(Feed::Search(query.to_string()))
        }
    }

    /// The category or search term identifying this feed.
    pub fn key(&self) -> &str {
        match self {
            Feed::Headlines(category) => category,
            Feed::Search(query) => query,
        }
    }

    pub fn cache_prefix(&self) -> &'static str {
        match self {
            Feed::Headlines(_) => "dailystream_top_headlines_",
            Feed::Search(_) => "dailystream_search_",
        }
    }

    pub fn cache_key(&self) -> String {
        format!("{}{}", self.cache_prefix(), self.key())
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Headlines(category) => write!(f, "headlines/{category}"),
            Feed::Search(query) => write!(f, "search/{query:?}"),
        }
    }
}

//=========================================================================================
// Inbound Request and Upstream Query
//=========================================================================================

/// Query string accepted by both `/api/news` and `/api/news/search`.
///
/// Nothing here is rejected: paging values that are missing, zero or not a
/// number are simply dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRequest {
    pub category: Option<String>,
    pub q: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub page_size: Option<u32>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|count| *count > 0))
}

impl NewsRequest {
    pub fn category(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    pub fn query(&self) -> Option<&str> {
        non_empty(self.q.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// What the upstream is asked for: a category filter or a free-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Category(String),
    Text(String),
}

impl QueryTarget {
    pub fn general() -> Self {
        QueryTarget::Category(Category::General.as_str().to_string())
    }
}

impl From<ResourceKey> for QueryTarget {
    fn from(key: ResourceKey) -> Self {
        match key {
            ResourceKey::Category(category) => QueryTarget::Category(category.as_str().to_string()),
            ResourceKey::SearchTerm(term) => QueryTarget::Text(term),
        }
    }
}

/// The normalized parameter set sent to the upstream `top-headlines` endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    pub api_key: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl QueryParameters {
    pub fn new(api_key: impl Into<String>, language: impl Into<String>, target: QueryTarget) -> Self {
        let (category, q) = match target {
            QueryTarget::Category(category) => (Some(category), None),
            QueryTarget::Text(text) => (None, Some(text)),
        };
        Self {
            api_key: api_key.into(),
            language: language.into(),
            category,
            q,
            page: None,
            page_size: None,
        }
    }

    pub fn with_paging(mut self, page: Option<u32>, page_size: Option<u32>) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParameters")
            .field("api_key", &"<redacted>")
            .field("language", &self.language)
            .field("category", &self.category)
            .field("q", &self.q)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .finish()
    }
}

//=========================================================================================
// Upstream Payload
//=========================================================================================

/// The publisher block of an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single article as returned by the upstream provider.
///
/// Fields the client does not read are kept in `extra` so the payload can be
/// handed on without reshaping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn image_url(&self) -> &str {
        self.url_to_image
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    pub fn source_name(&self) -> &str {
        self.source
            .as_ref()
            .and_then(|source| source.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SOURCE_NAME)
    }
}

/// The upstream `top-headlines` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPayload {
    pub status: String,
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl NewsPayload {
    /// What a failed search reads as on the client: "no results".
    pub fn empty() -> Self {
        Self {
            status: "ok".to_string(),
            total_results: 0,
            articles: Vec::new(),
        }
    }
}

//=========================================================================================
// Response Envelope
//=========================================================================================

/// The `{success, data | message}` wrapper returned by our own endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NewsPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    pub fn ok(data: NewsPayload) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Returns the payload of a successful envelope, or the failure message.
    pub fn into_result(self) -> Result<NewsPayload, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("envelope reported success without data".to_string()),
            (false, _) => Err(self
                .message
                .unwrap_or_else(|| "API returned unsuccessful response".to_string())),
        }
    }
}
