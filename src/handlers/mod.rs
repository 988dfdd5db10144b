pub mod info;
pub mod load;
pub mod messages;

use axum::{
    extract::State,
    http::{Method, Uri},
    response::Html,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::HealthCheck,
    AppState,
};

const INDEX_HTML: &str = include_str!("../../static/index.html");

// ── GET / ────────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/",
    tag = "pages",
    responses((status = 200, description = "Landing page listing every endpoint", body = String, content_type = "text/html"))
)]
pub async fn root() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ── GET /health ──────────────────────────────────────────────────────────────

/// Load balancer target. Always healthy; unreadable host facts show up as placeholder values.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is healthy", body = HealthCheck))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthCheck> {
    Json(HealthCheck::healthy(state.system.system_info().await))
}

// ── GET /ping ────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/ping",
    tag = "health",
    responses((status = 200, description = "Liveness ping", body = Object,
        example = json!({ "message": "pong", "timestamp": "2024-01-01T00:00:00Z" })))
)]
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "message": "pong", "timestamp": Utc::now() }))
}

// ── Fallback ─────────────────────────────────────────────────────────────────

pub async fn not_found(uri: Uri) -> AppResult<()> {
    Err(AppError::NotFound {
        path: request_path(&uri),
    })
}

/// Known path, unsupported method.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppResult<()> {
    Err(AppError::MethodNotAllowed {
        method: method.to_string(),
        path: request_path(&uri),
    })
}

pub(crate) fn request_path(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}
