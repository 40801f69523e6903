use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::PathBuf,
    str::FromStr,
};
use thiserror::Error;
use tracing::debug;

use shared::domain::{Book, BookId};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("book {0} already exists")]
    Duplicate(BookId),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);
        // Every connection to an in-memory url opens its own empty database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        debug!(%database_url, max_connections, "book storage ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All books in insertion order.
    pub async fn list_books(&self) -> Result<Vec<Book>, StorageError> {
        let rows = sqlx::query("SELECT id, title, author FROM books ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(book_from_row).collect())
    }

    pub async fn get_book(&self, id: &BookId) -> Result<Option<Book>, StorageError> {
        let row = sqlx::query("SELECT id, title, author FROM books WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(book_from_row))
    }

    pub async fn insert_book(&self, book: &Book) -> Result<(), StorageError> {
        let inserted = sqlx::query(
            "INSERT INTO books (id, title, author) VALUES (?, ?, ?)
             ON CONFLICT(id) DO NOTHING
             RETURNING seq",
        )
        .bind(book.id.as_str())
        .bind(&book.title)
        .bind(&book.author)
        .fetch_optional(&self.pool)
        .await?;
        match inserted {
            Some(_) => Ok(()),
            None => Err(StorageError::Duplicate(book.id.clone())),
        }
    }

    /// Replaces title and author in place. Returns `false` when no book has `book.id`.
    pub async fn update_book(&self, book: &Book) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE books SET title = ?, author = ? WHERE id = ?")
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_book(&self, id: &BookId) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn book_from_row(row: &SqliteRow) -> Book {
    Book {
        id: BookId(row.get::<String, _>("id")),
        title: row.get::<String, _>("title"),
        author: row.get::<String, _>("author"),
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

/// Turns a bare file path or a `sqlite:` path into a `sqlite://` url. In-memory
/// urls and urls with any other scheme pass through. Blank input yields `None`.
pub fn normalize_database_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains("://") || is_memory_url(raw) {
        return Some(raw.to_string());
    }
    let path = raw.strip_prefix("sqlite:").unwrap_or(raw);
    Some(format!("sqlite://{}", path.replace('\\', "/")))
}

/// Creates the directory a file-backed sqlite url points into.
pub fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };
    let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) {
        return None;
    }
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split_once('?').map_or(rest, |(path, _)| path);
    (!path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
