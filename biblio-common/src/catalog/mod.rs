//! Catalog engine
//!
//! Pure transformations over the book record set:
//! - [`date`]: year/month extraction from free-text dates
//! - [`record`]: record model, normalization and boundary validation
//! - [`search`]: case-insensitive search filter
//! - [`view`]: grouped and sorted catalog views
//!
//! Nothing here touches storage or the network. Every view is recomputed
//! from (records, search term, view mode) on each request.

pub mod collation;
pub mod date;
pub mod record;
pub mod search;
pub mod view;

pub use date::{extract_month, extract_year, parse_date, DateParts};
pub use record::{normalize_book, normalize_priority, Book, BookPatch, NewBook, Validated};
pub use search::matches;
pub use view::{build_view, recent_releases, Bucket, CatalogView, ViewMode};
