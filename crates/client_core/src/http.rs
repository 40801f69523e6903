//! HTTP client for the `/books` API.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{Book, BookId},
    error::ApiError,
    protocol::{BookUpdate, NewBook},
};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::loader::{parse_books, BookSource, LoadError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Load(LoadError::Status { status }) => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookClient {
    http: Client,
    base_url: Url,
}

impl BookClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(server_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "'{server_url}' cannot be used as a base url"
            )));
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn list_books(&self) -> Result<Vec<Book>, ClientError> {
        let url = self.endpoint(&["books"])?;
        debug!(%url, "listing books");
        let res = self.http.get(url).send().await?;
        let res = ok_or_api_error(res).await?;
        Ok(parse_books(&res.text().await?)?)
    }

    pub async fn get_book(&self, id: &BookId) -> Result<Book, ClientError> {
        let url = self.endpoint(&["books", id.as_str()])?;
        let res = ok_or_api_error(self.http.get(url).send().await?).await?;
        Ok(res.json().await?)
    }

    pub async fn create_book(&self, book: &NewBook) -> Result<Book, ClientError> {
        let url = self.endpoint(&["books"])?;
        let res = ok_or_api_error(self.http.post(url).json(book).send().await?).await?;
        Ok(res.json().await?)
    }

    pub async fn update_book(&self, id: &BookId, update: &BookUpdate) -> Result<Book, ClientError> {
        let url = self.endpoint(&["books", id.as_str()])?;
        let res = ok_or_api_error(self.http.put(url).json(update).send().await?).await?;
        Ok(res.json().await?)
    }

    pub async fn delete_book(&self, id: &BookId) -> Result<(), ClientError> {
        let url = self.endpoint(&["books", id.as_str()])?;
        ok_or_api_error(self.http.delete(url).send().await?).await?;
        Ok(())
    }
}

async fn ok_or_api_error(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|err| err.message)
        .unwrap_or_else(|_| fallback_message(status, body));
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

fn fallback_message(status: StatusCode, body: String) -> String {
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    }
}

#[async_trait(?Send)]
impl BookSource for BookClient {
    async fn fetch_books(&self) -> Result<Vec<Book>, LoadError> {
        let url = self
            .endpoint(&["books"])
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            return Err(LoadError::Status {
                status: res.status().as_u16(),
            });
        }
        let body = res
            .text()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;
        parse_books(&body)
    }
}
