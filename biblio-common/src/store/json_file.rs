//! Flat JSON file store
//!
//! Fallback storage when no database is configured. The whole array is read
//! on every call and rewritten on every mutation. Records are addressed by an
//! `id` kept in the file; records that arrive without one (hand-edited files,
//! legacy bulk replace) are numbered after the current maximum.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use super::{CatalogStore, StoreBackend};
use crate::catalog::{normalize_book, Book, BookPatch, NewBook};
use crate::{Error, Result};

/// Catalog stored in a single JSON file
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and normalize the file; a missing file is an empty catalog
    async fn load(&self) -> Result<Vec<Book>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} not found, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_str(&contents)?;
        let Value::Array(items) = value else {
            return Err(Error::InvalidInput(format!(
                "{} must contain a JSON array",
                self.path.display()
            )));
        };

        let mut books: Vec<Book> = items.iter().map(normalize_book).collect();
        assign_missing_ids(&mut books);
        Ok(books)
    }

    /// Write through a temporary file so readers never see a partial array
    async fn save(&self, books: &[Book]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(books)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn next_id(books: &[Book]) -> i64 {
    books.iter().filter_map(|b| b.id).max().unwrap_or(0) + 1
}

fn assign_missing_ids(books: &mut [Book]) {
    let mut next = next_id(books);
    for book in books.iter_mut().filter(|b| b.id.is_none()) {
        book.id = Some(next);
        next += 1;
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("livre {}", id))
}

#[async_trait]
impl CatalogStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Book>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn get(&self, id: i64) -> Result<Book> {
        let _guard = self.lock.lock().await;
        self.load()
            .await?
            .into_iter()
            .find(|b| b.id == Some(id))
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, book: NewBook) -> Result<Book> {
        let _guard = self.lock.lock().await;
        let mut books = self.load().await?;

        let mut created = book.into_book();
        created.id = Some(next_id(&books));
        books.push(created.clone());

        self.save(&books).await?;
        Ok(created)
    }

    async fn create_many(&self, new_books: Vec<NewBook>) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut books = self.load().await?;

        let count = new_books.len();
        books.extend(new_books.into_iter().map(NewBook::into_book));
        assign_missing_ids(&mut books);

        self.save(&books).await?;
        Ok(count)
    }

    async fn update(&self, id: i64, patch: BookPatch) -> Result<Book> {
        let _guard = self.lock.lock().await;
        let mut books = self.load().await?;

        let book = books
            .iter_mut()
            .find(|b| b.id == Some(id))
            .ok_or_else(|| not_found(id))?;
        patch.apply(book);
        let updated = book.clone();

        self.save(&books).await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut books = self.load().await?;

        let index = books
            .iter()
            .position(|b| b.id == Some(id))
            .ok_or_else(|| not_found(id))?;
        books.remove(index);

        self.save(&books).await
    }

    async fn replace_all(&self, records: Vec<Value>) -> Result<usize> {
        let _guard = self.lock.lock().await;

        let mut books: Vec<Book> = records.iter().map(normalize_book).collect();
        assign_missing_ids(&mut books);

        self.save(&books).await?;
        Ok(books.len())
    }

    async fn ping(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.load().await.map(|_| ())
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::JsonFile
    }
}
