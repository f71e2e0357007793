//! # Biblio Common Library
//!
//! Shared code for the translator catalog service including:
//! - Book record model and boundary validation
//! - Catalog engine (date parsing, search filter, grouped views)
//! - Catalog stores (SQLite backend and JSON file fallback)
//! - Admin authentication and sessions
//! - Configuration loading

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod store;

pub use catalog::{Book, BookPatch, NewBook};
pub use error::{Error, Result};
pub use store::{CatalogStore, StoreBackend};
