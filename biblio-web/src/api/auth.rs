//! Admin login, logout and session middleware
//!
//! Login compares the submitted password with the server-held one and
//! issues an expiring bearer token. Admin routes go through
//! [`require_admin`], which accepts only live tokens.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Json,
};
use biblio_common::auth::verify_password;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

/// Login response with the issued session
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Bearer token from the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// POST /api/admin/auth
pub async fn login(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = request?;
    let Some(expected) = state.admin_password.as_deref() else {
        error!("ADMIN_PASSWORD not configured");
        return Err(ApiError::Config(
            "Admin password not configured".to_string(),
        ));
    };

    let provided = request.password.unwrap_or_default();
    if !verify_password(&provided, expected) {
        warn!("Admin login failed");
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    let session = state.sessions.issue();
    info!("Admin session opened (expires {})", session.expires_at);

    Ok(Json(LoginResponse {
        success: true,
        token: session.token,
        expires_at: session.expires_at,
    }))
}

/// POST /api/admin/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token);
        info!("Admin session closed");
    }
    Json(json!({ "success": true }))
}

/// Session middleware for admin routes
///
/// Returns 401 Unauthorized when the bearer token is missing, unknown or
/// expired.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = match bearer_token(request.headers()) {
        Some(token) => state.sessions.validate(token),
        None => return Err(ApiError::Unauthorized("Missing bearer token".to_string())),
    };

    if !authorized {
        return Err(ApiError::Unauthorized(
            "Invalid or expired session".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
