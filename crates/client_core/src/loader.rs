use std::cell::RefCell;

use async_trait::async_trait;
use serde_json::Value;
use shared::domain::Book;
use thiserror::Error;
use tracing::info;

use crate::page::{BookPage, LoadOutcome};

/// Resource path the page reads its books from.
pub const BOOKS_PATH: &str = "/books";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not reach the book server: {0}")]
    Transport(String),
    #[error("book server answered with HTTP {status}")]
    Status { status: u16 },
    #[error("book list is malformed: {0}")]
    Malformed(String),
}

/// Where the page gets its book records from.
#[async_trait(?Send)]
pub trait BookSource {
    async fn fetch_books(&self) -> Result<Vec<Book>, LoadError>;
}

/// Parses a `GET /books` body: a JSON array of book objects.
pub fn parse_books(body: &str) -> Result<Vec<Book>, LoadError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LoadError::Malformed(e.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(LoadError::Malformed("expected a JSON array".into()));
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            if !entry.is_object() {
                return Err(LoadError::Malformed(format!(
                    "entry {index} is not an object"
                )));
            }
            serde_json::from_value::<Book>(entry)
                .map_err(|e| LoadError::Malformed(format!("entry {index}: {e}")))
        })
        .collect()
}

/// Runs one load: a single fetch, then a render (or error state) on `page`.
///
/// `page` is only borrowed once the fetch has finished, so drag handlers that
/// share it keep working while the request is in flight.
pub async fn load_into<S>(source: &S, page: &RefCell<BookPage>) -> LoadOutcome
where
    S: BookSource + ?Sized,
{
    let result = source.fetch_books().await;
    if let Ok(books) = &result {
        info!(count = books.len(), "fetched books");
    }
    page.borrow_mut().apply_load(result)
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
