//! biblio-web library - public catalog and admin HTTP API
//!
//! Public routes serve the catalog and its grouped views. Admin routes
//! (create, update, delete, legacy bulk replace, logout) require a bearer
//! session token obtained from `POST /api/admin/auth`.

use axum::Router;
use biblio_common::auth::SessionStore;
use biblio_common::config::Config;
use biblio_common::store::{CatalogStore, JsonFileStore, SqliteStore};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog backend (SQLite or JSON file fallback)
    pub store: Arc<dyn CatalogStore>,
    /// Live admin sessions
    pub sessions: Arc<SessionStore>,
    /// Server-held admin password; `None` disables login
    pub admin_password: Option<Arc<str>>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: Arc<dyn CatalogStore>,
        sessions: SessionStore,
        admin_password: Option<String>,
    ) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
            admin_password: admin_password.map(Arc::from),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post, put};

    // Admin routes (require a session token)
    let protected = Router::new()
        .route(
            "/api/livres",
            post(api::create_book).put(api::replace_books),
        )
        .route(
            "/api/livres/:id",
            put(api::update_book).delete(api::delete_book),
        )
        .route("/api/admin/logout", post(api::logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/livres", get(api::list_books))
        .route("/api/livres/:id", get(api::get_book))
        .route("/api/catalog", get(api::get_catalog))
        .route("/api/catalog/recent", get(api::get_recent_releases))
        .route("/api/admin/auth", post(api::login))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Open the configured store
///
/// With a database configured, the SQLite store is used; if it cannot be
/// opened the service falls back to the JSON file so the public catalog
/// stays readable. Without a database, the JSON file is used directly.
pub async fn open_store(config: &Config) -> Arc<dyn CatalogStore> {
    if let Some(db_path) = &config.database {
        match SqliteStore::open(db_path).await {
            Ok(store) => {
                info!("✓ Using SQLite catalog: {}", db_path.display());
                return Arc::new(store);
            }
            Err(e) => {
                error!("Failed to open database {}: {}", db_path.display(), e);
                warn!("Falling back to JSON file storage");
            }
        }
    } else {
        info!("No database configured");
    }

    info!("Using JSON catalog file: {}", config.livres_file.display());
    Arc::new(JsonFileStore::new(config.livres_file.clone()))
}
