//! Health check endpoint
//!
//! Reports whether the relational backend is configured and reachable.
//! Answers 503 while the service runs on the JSON file fallback, so that
//! monitoring notices the degraded mode.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use biblio_common::StoreBackend;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub backend: BackendStatus,
}

/// Catalog backend status
#[derive(Debug, Serialize)]
pub struct BackendStatus {
    pub kind: StoreBackend,
    /// A relational backend is in use
    pub configured: bool,
    /// The backend answered a trivial query
    pub reachable: bool,
}

/// GET /health
///
/// Does NOT require authentication.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let kind = state.store.backend();
    let configured = kind == StoreBackend::Sqlite;

    let reachable = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check: catalog backend unreachable: {}", e);
            false
        }
    };

    let (status_code, status) = if configured && reachable {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status.to_string(),
        module: "biblio-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        backend: BackendStatus {
            kind,
            configured,
            reachable,
        },
    };

    (
        status_code,
        [(header::CACHE_CONTROL, "no-store, no-cache, must-revalidate")],
        Json(body),
    )
        .into_response()
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
