//! Book record CRUD
//!
//! Payloads are validated at the boundary: a rejected payload answers 400
//! before the store is touched.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use biblio_common::catalog::{Book, BookPatch, NewBook, Validated};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Keep storage identifiers in the response
    #[serde(default)]
    pub include_id: bool,
}

fn rejected(reasons: Vec<String>) -> ApiError {
    ApiError::BadRequest(reasons.join("; "))
}

/// GET /api/livres
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Book>>> {
    let Query(query) = query?;
    let books = state.store.list().await?;

    let books = if query.include_id {
        books
    } else {
        books.into_iter().map(Book::without_id).collect()
    };

    Ok(Json(books))
}

/// GET /api/livres/:id
pub async fn get_book(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = path?;
    Ok(Json(state.store.get(id).await?))
}

/// POST /api/livres (admin)
pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let Json(payload) = payload?;
    let book = match NewBook::validate(&payload) {
        Validated::Valid(book) => book,
        Validated::Rejected(reasons) => return Err(rejected(reasons)),
    };

    let created = state.store.create(book).await?;
    info!("Created livre {:?}: {}", created.id, created.titre.as_deref().unwrap_or(""));

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/livres/:id (admin)
pub async fn update_book(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Path(id) = path?;
    let Json(payload) = payload?;
    let patch = match BookPatch::validate(&payload) {
        Validated::Valid(patch) => patch,
        Validated::Rejected(reasons) => return Err(rejected(reasons)),
    };

    let updated = state.store.update(id, patch).await?;
    info!("Updated livre {}", id);

    Ok(Json(updated))
}

/// DELETE /api/livres/:id (admin)
pub async fn delete_book(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    state.store.delete(id).await?;
    info!("Deleted livre {}", id);

    Ok(Json(json!({ "success": true })))
}

/// PUT /api/livres (admin, deprecated)
///
/// Replaces the whole catalog with the submitted array. Kept for the old
/// admin flow and data migrations only; concurrent edits made through the
/// per-record routes are lost.
pub async fn replace_books(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(payload) = payload?;
    let Value::Array(records) = payload else {
        return Err(ApiError::BadRequest("Payload must be a JSON array".to_string()));
    };

    warn!(
        "Deprecated bulk replace called with {} records",
        records.len()
    );
    let count = state.store.replace_all(records).await?;

    Ok(Json(json!({ "success": true, "count": count })))
}
