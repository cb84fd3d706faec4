//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use dailystream_core::domain::{NewsPayload, NewsRequest, ResponseEnvelope};
use dailystream_core::resolver::ResolveError;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        wake_handler,
        news_handler,
        search_news_handler,
    ),
    components(
        schemas(WakeResponse)
    ),
    tags(
        (name = "DailyStream API", description = "Headline and search proxy for the DailyStream reader.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response Structs
//=========================================================================================

/// Liveness answer for `/api/wake`.
#[derive(Serialize, ToSchema)]
pub struct WakeResponse {
    status: String,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Plain-text liveness string.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is running", body = String))
)]
pub async fn root_handler() -> &'static str {
    "NewsAPI Service is running"
}

/// Wakes an idle deployment. Has no side effects.
#[utoipa::path(
    get,
    path = "/api/wake",
    responses((status = 200, description = "Server is awake", body = WakeResponse))
)]
pub async fn wake_handler() -> Json<WakeResponse> {
    Json(WakeResponse {
        status: "Server is awake".to_string(),
    })
}

/// Top headlines for a category, a free-text query, or the general category.
#[utoipa::path(
    get,
    path = "/api/news",
    params(
        ("category" = Option<String>, Query, description = "Upstream category filter. Takes precedence over `q`."),
        ("q" = Option<String>, Query, description = "Free-text query, used only when no category is given."),
        ("page" = Option<u32>, Query, description = "1-based page number."),
        ("pageSize" = Option<u32>, Query, description = "Articles per page."),
    ),
    responses(
        (status = 200, description = "`{success: true, data}` with the upstream payload"),
        (status = 500, description = "`{success: false, message}`: missing API key or upstream failure"),
    )
)]
pub async fn news_handler(
    State(app_state): State<Arc<AppState>>,
    Query(request): Query<NewsRequest>,
) -> Response {
    envelope_response("news", app_state.resolver.headlines(&request).await)
}

/// Search with category detection: a term naming a category filters by it.
#[utoipa::path(
    get,
    path = "/api/news/search",
    params(
        ("q" = Option<String>, Query, description = "Search term. Category names act as category filters."),
        ("page" = Option<u32>, Query, description = "1-based page number."),
        ("pageSize" = Option<u32>, Query, description = "Articles per page."),
    ),
    responses(
        (status = 200, description = "`{success: true, data}` with the upstream payload"),
        (status = 500, description = "`{success: false, message}`: missing API key or upstream failure"),
    )
)]
pub async fn search_news_handler(
    State(app_state): State<Arc<AppState>>,
    Query(request): Query<NewsRequest>,
) -> Response {
    envelope_response("news search", app_state.resolver.search(&request).await)
}

/// Wraps a resolver outcome in the `{success, data | message}` envelope,
/// mirroring the upstream status on failure.
fn envelope_response(operation: &str, result: Result<NewsPayload, ResolveError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ResponseEnvelope::ok(data))).into_response(),
        Err(e) => {
            error!("Error fetching {}: {}", operation, e);
            let status = StatusCode::from_u16(e.status_code())
                .ok()
                .filter(|status| !status.is_success())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ResponseEnvelope::failure(e.message()))).into_response()
        }
    }
}
