use async_trait::async_trait;
use client_core::{parse_books, BookSource, LoadError};
use gloo::net::http::Request;
use shared::domain::Book;
use tracing::debug;

/// Reads books with the browser's `fetch`, relative to the page origin.
pub struct FetchBookSource {
    path: String,
}

impl FetchBookSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait(?Send)]
impl BookSource for FetchBookSource {
    async fn fetch_books(&self) -> Result<Vec<Book>, LoadError> {
        debug!(path = %self.path, "fetching books");
        let res = Request::get(&self.path)
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        if !res.ok() {
            return Err(LoadError::Status {
                status: res.status(),
            });
        }
        let body = res
            .text()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        parse_books(&body)
    }
}
