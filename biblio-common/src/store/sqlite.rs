//! SQLite catalog store
//!
//! The `livres` table is created on open if missing, so a fresh database
//! file works with no setup step.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::path::Path;
use tracing::info;

use super::{CatalogStore, StoreBackend};
use crate::catalog::{normalize_book, Book, BookPatch, NewBook};
use crate::{Error, Result};

const SELECT_COLUMNS: &str = "SELECT id, titre, auteur, date, editeur, genre, \
     info_supplementaires, image_url, priorite FROM livres";

/// Catalog stored in a SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new database: {}", db_path.display());
        } else {
            info!("Opened existing database: {}", db_path.display());
        }

        // WAL lets public reads proceed while an admin edit is written
        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema if needed
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_livres_table(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn create_livres_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS livres (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            titre TEXT,
            auteur TEXT,
            date TEXT,
            editeur TEXT,
            genre TEXT,
            info_supplementaires TEXT,
            image_url TEXT,
            priorite REAL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn row_to_book(row: &SqliteRow) -> Result<Book> {
    Ok(Book {
        id: Some(row.try_get("id")?),
        titre: row.try_get("titre")?,
        auteur: row.try_get("auteur")?,
        date: row.try_get("date")?,
        editeur: row.try_get("editeur")?,
        genre: row.try_get("genre")?,
        info_supplementaires: row.try_get("info_supplementaires")?,
        image_url: row.try_get("image_url")?,
        priorite: row.try_get("priorite")?,
    })
}

async fn insert_book(tx: &mut Transaction<'_, Sqlite>, book: &Book) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO livres
            (titre, auteur, date, editeur, genre, info_supplementaires, image_url, priorite)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.titre)
    .bind(&book.auteur)
    .bind(&book.date)
    .bind(&book.editeur)
    .bind(&book.genre)
    .bind(&book.info_supplementaires)
    .bind(&book.image_url)
    .bind(book.priorite)
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("livre {}", id))
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_book).collect()
    }

    async fn get(&self, id: i64) -> Result<Book> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))?;
        row_to_book(&row)
    }

    async fn create(&self, book: NewBook) -> Result<Book> {
        let mut tx = self.pool.begin().await?;
        let mut created = book.into_book();
        created.id = Some(insert_book(&mut tx, &created).await?);
        tx.commit().await?;
        Ok(created)
    }

    async fn create_many(&self, books: Vec<NewBook>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let count = books.len();
        for book in books {
            insert_book(&mut tx, &book.into_book()).await?;
        }
        tx.commit().await?;
        Ok(count)
    }

    async fn update(&self, id: i64, patch: BookPatch) -> Result<Book> {
        let mut book = self.get(id).await?;
        patch.apply(&mut book);

        let result = sqlx::query(
            r#"
            UPDATE livres SET
                titre = ?, auteur = ?, date = ?, editeur = ?, genre = ?,
                info_supplementaires = ?, image_url = ?, priorite = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&book.titre)
        .bind(&book.auteur)
        .bind(&book.date)
        .bind(&book.editeur)
        .bind(&book.genre)
        .bind(&book.info_supplementaires)
        .bind(&book.image_url)
        .bind(book.priorite)
        .bind(id)
        .execute(&self.pool)
        .await?;

        // Deleted between the read and the write
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(book)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM livres WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn replace_all(&self, records: Vec<Value>) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM livres").execute(&mut *tx).await?;

        let mut count = 0;
        for record in &records {
            insert_book(&mut tx, &normalize_book(record)).await?;
            count += 1;
        }

        tx.commit().await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> StoreBackend {
        StoreBackend::Sqlite
    }
}
