//! Public catalog views
//!
//! `GET /api/catalog?vue=genre&q=roman` returns the selected view computed
//! from the current record set. Unknown view names fall back to the
//! priority view.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use biblio_common::catalog::view::RECENT_YEARS;
use biblio_common::catalog::{build_view, recent_releases, Book, Bucket, CatalogView, ViewMode};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for the catalog view
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// View name: priorite, genre, editeur, auteur or date
    pub vue: Option<String>,
    /// Search term
    pub q: Option<String>,
}

/// Catalog view response
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub vue: ViewMode,
    pub recherche: String,
    pub total: usize,
    #[serde(flatten)]
    pub view: CatalogView,
}

/// Query parameters for recent releases
#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub years: Option<u32>,
}

/// Recent releases response
#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub years: u32,
    pub since: i32,
    pub buckets: Vec<Bucket>,
}

async fn public_books(state: &AppState) -> ApiResult<Vec<Book>> {
    let books = state.store.list().await?;
    Ok(books.into_iter().map(Book::without_id).collect())
}

/// GET /api/catalog
pub async fn get_catalog(
    State(state): State<AppState>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> ApiResult<Json<CatalogResponse>> {
    let Query(query) = query?;
    let books = public_books(&state).await?;

    let mode = query.vue.as_deref().map(ViewMode::parse).unwrap_or_default();
    let term = query.q.unwrap_or_default();
    let view = build_view(&books, &term, mode);

    Ok(Json(CatalogResponse {
        vue: mode,
        recherche: term,
        total: view.len(),
        view,
    }))
}

/// GET /api/catalog/recent
pub async fn get_recent_releases(
    State(state): State<AppState>,
    query: Result<Query<RecentQuery>, QueryRejection>,
) -> ApiResult<Json<RecentResponse>> {
    let Query(query) = query?;
    let books = public_books(&state).await?;

    let years = query.years.unwrap_or(RECENT_YEARS).clamp(1, 200);
    let current_year = Utc::now().year();
    let buckets = recent_releases(&books, current_year, years);

    Ok(Json(RecentResponse {
        years,
        since: current_year - years as i32 + 1,
        buckets,
    }))
}
