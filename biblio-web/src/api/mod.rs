//! HTTP API handlers for biblio-web

pub mod auth;
pub mod books;
pub mod catalog;
pub mod health;

pub use auth::{login, logout, require_admin};
pub use books::{create_book, delete_book, get_book, list_books, replace_books, update_book};
pub use catalog::{get_catalog, get_recent_releases};
pub use health::health_routes;
