//! Catalog storage
//!
//! [`CatalogStore`] abstracts the two backends:
//! - [`SqliteStore`]: relational backend, identifiers assigned by the database
//! - [`JsonFileStore`]: flat JSON file, used when no database is configured
//!
//! No retries, no cross-call transactions: last write wins.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::catalog::{normalize_book, Book, BookPatch, NewBook};
use crate::{Error, Result};

mod json_file;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use json_file::JsonFileStore;
#[cfg(feature = "sqlx")]
pub use sqlite::SqliteStore;

/// Number of records inserted per batch by [`import_json`]
pub const IMPORT_BATCH_SIZE: usize = 100;

/// Which backend a store writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Sqlite,
    JsonFile,
}

/// Read/write access to the book record set
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All records, identifiers included
    async fn list(&self) -> Result<Vec<Book>>;

    /// One record by identifier
    async fn get(&self, id: i64) -> Result<Book>;

    /// Insert a record and return it with its identifier
    async fn create(&self, book: NewBook) -> Result<Book>;

    /// Insert several records as one unit
    ///
    /// Either all records are stored or none are.
    async fn create_many(&self, books: Vec<NewBook>) -> Result<usize>;

    /// Apply a partial update and return the updated record
    async fn update(&self, id: i64, patch: BookPatch) -> Result<Book>;

    /// Remove a record
    async fn delete(&self, id: i64) -> Result<()>;

    /// Replace the whole record set (legacy admin flow)
    ///
    /// Elements are normalized leniently; the returned count is the number of
    /// records stored.
    async fn replace_all(&self, records: Vec<Value>) -> Result<usize>;

    /// Check that the backend answers
    async fn ping(&self) -> Result<()>;

    /// Backend kind, for health reporting
    fn backend(&self) -> StoreBackend;
}

/// Outcome of [`import_json`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Records already in the store before the import
    pub existing: usize,
    /// Records found in the source file
    pub found: usize,
    /// Records stored
    pub inserted: usize,
    /// Records without a usable title
    pub skipped: usize,
    /// Records in batches that failed to insert
    pub failed: usize,
}

/// Import a JSON array of books from `path` into `store`
///
/// Records are inserted in batches of [`IMPORT_BATCH_SIZE`]. A failing batch
/// is counted and logged, and the import moves on to the next one. Existing
/// records are left in place, so running an import twice duplicates them.
pub async fn import_json(store: &dyn CatalogStore, path: &Path) -> Result<ImportSummary> {
    info!("Reading {}", path.display());
    let contents = tokio::fs::read_to_string(path).await?;
    let value: Value = serde_json::from_str(&contents)?;

    let Value::Array(items) = value else {
        return Err(Error::InvalidInput(format!(
            "{} must contain a JSON array",
            path.display()
        )));
    };

    let mut summary = ImportSummary {
        found: items.len(),
        ..ImportSummary::default()
    };
    info!("{} records found", summary.found);

    summary.existing = store.list().await?.len();
    if summary.existing > 0 {
        warn!(
            "Catalog already holds {} records; imported records will duplicate any that match",
            summary.existing
        );
    }

    let books: Vec<NewBook> = items
        .iter()
        .filter_map(|item| {
            let book = NewBook::from_book(normalize_book(item));
            if book.is_none() {
                summary.skipped += 1;
            }
            book
        })
        .collect();

    if summary.skipped > 0 {
        warn!("{} records without a title skipped", summary.skipped);
    }

    for (index, batch) in books.chunks(IMPORT_BATCH_SIZE).enumerate() {
        match store.create_many(batch.to_vec()).await {
            Ok(count) => {
                summary.inserted += count;
                info!(
                    "Batch {} stored ({}/{})",
                    index + 1,
                    summary.inserted,
                    books.len()
                );
            }
            Err(e) => {
                summary.failed += batch.len();
                warn!("Batch {} failed: {}", index + 1, e);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_import_skips_untitled_and_counts() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.json");
        let records: Vec<Value> = (0..150)
            .map(|i| json!({"titre": format!("Livre {}", i), "priorite": i}))
            .chain([json!({"auteur": "Sans titre"}), json!({"titre": ""})])
            .collect();
        std::fs::write(&source, serde_json::to_string(&records).unwrap()).unwrap();

        let store = JsonFileStore::new(dir.path().join("livres.json"));
        let summary = import_json(&store, &source).await.unwrap();

        assert_eq!(summary.existing, 0);
        assert_eq!(summary.found, 152);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.inserted, 150);
        assert_eq!(summary.failed, 0);
        assert_eq!(store.list().await.unwrap().len(), 150);
    }

    #[tokio::test]
    async fn test_import_into_non_empty_store_appends() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.json");
        std::fs::write(&source, r#"[{"titre": "Déjà là"}, {"titre": "Nouveau"}]"#).unwrap();

        let store = JsonFileStore::new(dir.path().join("livres.json"));
        store
            .create(NewBook {
                titre: "Déjà là".to_string(),
                ..NewBook::default()
            })
            .await
            .unwrap();

        let summary = import_json(&store, &source).await.unwrap();
        assert_eq!(summary.existing, 1);
        assert_eq!(summary.inserted, 2);

        let titles: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|b| b.titre)
            .collect();
        assert_eq!(titles, vec!["Déjà là", "Déjà là", "Nouveau"]);
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.json");
        std::fs::write(&source, r#"{"titre": "seul"}"#).unwrap();

        let store = JsonFileStore::new(dir.path().join("livres.json"));
        let result = import_json(&store, &source).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
