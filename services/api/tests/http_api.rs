//! End-to-end tests of the HTTP surface with a fake news provider behind it.

use api_lib::config::Config;
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use dailystream_core::domain::{Article, NewsPayload, QueryParameters};
use dailystream_core::ports::{NewsProvider, PortError, PortResult};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct FakeProvider {
    calls: Mutex<Vec<QueryParameters>>,
    outcome: PortResult<NewsPayload>,
}

impl FakeProvider {
    fn answering(outcome: PortResult<NewsPayload>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            outcome,
        })
    }

    fn calls(&self) -> Vec<QueryParameters> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsProvider for FakeProvider {
    async fn top_headlines(&self, params: &QueryParameters) -> PortResult<NewsPayload> {
        self.calls.lock().unwrap().push(params.clone());
        self.outcome.clone()
    }
}

fn config(api_key: Option<&str>) -> Config {
    let api_key = api_key.map(str::to_string);
    Config::from_lookup(|name| match name {
        "NEWS_API_KEY" => api_key.clone(),
        _ => None,
    })
    .unwrap()
}

fn app(provider: Arc<FakeProvider>, api_key: Option<&str>) -> axum::Router {
    router(Arc::new(AppState::new(Arc::new(config(api_key)), provider)))
}

fn sample_payload() -> NewsPayload {
    NewsPayload {
        status: "ok".to_string(),
        total_results: 1,
        articles: vec![Article {
            title: Some("Markets rally".to_string()),
            url: Some("https://news.example/markets".to_string()),
            ..Article::default()
        }],
    }
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn root_reports_liveness_as_text() {
    let (status, body) = get(app(FakeProvider::answering(Ok(sample_payload())), None), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"NewsAPI Service is running");
}

#[tokio::test]
async fn wake_has_no_side_effects() {
    let provider = FakeProvider::answering(Ok(sample_payload()));
    let (status, body) = get_json(app(provider.clone(), None), "/api/wake").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Server is awake"}));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn headlines_wrap_the_upstream_payload() {
    let provider = FakeProvider::answering(Ok(sample_payload()));
    let (status, body) = get_json(
        app(provider.clone(), Some("key")),
        "/api/news?category=business&page=2&pageSize=10",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], serde_json::to_value(sample_payload()).unwrap());
    assert!(body.get("message").is_none());

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].category.as_deref(), Some("business"));
    assert_eq!(calls[0].q, None);
    assert_eq!(calls[0].page, Some(2));
    assert_eq!(calls[0].page_size, Some(10));
}

#[tokio::test]
async fn headlines_default_to_general() {
    let provider = FakeProvider::answering(Ok(sample_payload()));
    let (status, _) = get_json(app(provider.clone(), Some("key")), "/api/news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls()[0].category.as_deref(), Some("general"));
}

#[tokio::test]
async fn search_classifies_category_names() {
    let provider = FakeProvider::answering(Ok(sample_payload()));
    get_json(app(provider.clone(), Some("key")), "/api/news/search?q=Technology").await;
    get_json(app(provider.clone(), Some("key")), "/api/news/search?q=Mars%20Rover").await;
    get_json(app(provider.clone(), Some("key")), "/api/news/search").await;

    let calls = provider.calls();
    assert_eq!(calls[0].category.as_deref(), Some("technology"));
    assert_eq!(calls[0].q, None);
    assert_eq!(calls[1].q.as_deref(), Some("Mars Rover"));
    assert_eq!(calls[1].category, None);
    assert_eq!(calls[2].category.as_deref(), Some("general"));
}

#[tokio::test]
async fn unusable_paging_values_are_ignored() {
    let provider = FakeProvider::answering(Ok(sample_payload()));
    let (status, _) = get_json(
        app(provider.clone(), Some("key")),
        "/api/news?page=first&pageSize=",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.calls()[0].page, None);
    assert_eq!(provider.calls()[0].page_size, None);
}

#[tokio::test]
async fn missing_api_key_is_a_500_without_upstream_call() {
    let provider = FakeProvider::answering(Ok(sample_payload()));
    for uri in ["/api/news?category=sports", "/api/news/search?q=rust"] {
        let (status, body) = get_json(app(provider.clone(), None), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"success": false, "message": "News API key is not configured"})
        );
    }
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn upstream_status_and_message_are_mirrored() {
    let provider = FakeProvider::answering(Err(PortError::upstream(
        Some(429),
        Some("You have made too many requests recently.".to_string()),
    )));
    let (status, body) = get_json(app(provider, Some("key")), "/api/news/search?q=rust").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body,
        json!({"success": false, "message": "You have made too many requests recently."})
    );
}

#[tokio::test]
async fn unknown_upstream_failure_is_a_generic_500() {
    let provider = FakeProvider::answering(Err(PortError::upstream(None, None)));
    let (status, body) = get_json(app(provider, Some("key")), "/api/news").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"success": false, "message": "Failed to fetch news data"})
    );
}

#[tokio::test]
async fn cors_preflight_allows_configured_origins_only() {
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/news")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app(FakeProvider::answering(Ok(sample_payload())), Some("key"))
        .oneshot(preflight("http://localhost:5173"))
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        allowed
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );

    let rejected = app(FakeProvider::answering(Ok(sample_payload())), Some("key"))
        .oneshot(preflight("https://evil.example"))
        .await
        .unwrap();
    assert!(rejected
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn wildcard_in_the_origin_list_is_skipped() {
    let mut config = config(Some("key"));
    config.allowed_origins = vec!["*".to_string(), "http://localhost:5173".to_string()];
    let provider = FakeProvider::answering(Ok(sample_payload()));
    let app = router(Arc::new(AppState::new(Arc::new(config), provider)));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/news")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn openapi_document_lists_the_news_routes() {
    let (status, body) = get_json(
        app(FakeProvider::answering(Ok(sample_payload())), None),
        "/api-docs/openapi.json",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    for path in ["/", "/api/wake", "/api/news", "/api/news/search"] {
        assert!(body["paths"].get(path).is_some(), "missing {path}");
    }
}
