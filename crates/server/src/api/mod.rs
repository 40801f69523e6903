use shared::{
    domain::{Book, BookId},
    error::{ApiError, ErrorCode},
    protocol::{BookUpdate, NewBook},
};
use storage::{Storage, StorageError};
use tracing::{error, info};

pub const MAX_TITLE_BYTES: usize = 512;
pub const MAX_AUTHOR_BYTES: usize = 256;
pub const MAX_ID_BYTES: usize = 128;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_books(ctx: &ApiContext) -> Result<Vec<Book>, ApiError> {
    ctx.storage.list_books().await.map_err(storage_error)
}

pub async fn get_book(ctx: &ApiContext, id: &BookId) -> Result<Book, ApiError> {
    ctx.storage
        .get_book(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| not_found(id))
}

pub async fn create_book(ctx: &ApiContext, req: NewBook) -> Result<Book, ApiError> {
    if let Some(id) = req.id.as_ref().filter(|id| !id.is_empty()) {
        validate_id(id)?;
    }
    validate_text(&req.title, &req.author)?;

    let book = req.into_book();
    ctx.storage
        .insert_book(&book)
        .await
        .map_err(storage_error)?;
    info!(id = %book.id, "book created");
    Ok(book)
}

pub async fn update_book(
    ctx: &ApiContext,
    id: BookId,
    req: BookUpdate,
) -> Result<Book, ApiError> {
    validate_text(&req.title, &req.author)?;

    let book = req.into_book(id);
    let updated = ctx
        .storage
        .update_book(&book)
        .await
        .map_err(storage_error)?;
    if !updated {
        return Err(not_found(&book.id));
    }
    info!(id = %book.id, "book updated");
    Ok(book)
}

pub async fn delete_book(ctx: &ApiContext, id: &BookId) -> Result<(), ApiError> {
    let deleted = ctx.storage.delete_book(id).await.map_err(storage_error)?;
    if !deleted {
        return Err(not_found(id));
    }
    info!(%id, "book deleted");
    Ok(())
}

/// Inserts `books` only when the store is empty. Returns how many were written.
pub async fn seed_books(ctx: &ApiContext, books: Vec<Book>) -> Result<usize, ApiError> {
    if !list_books(ctx).await?.is_empty() {
        return Ok(0);
    }
    let mut written = 0;
    for book in books {
        let book = NewBook {
            id: Some(book.id),
            title: book.title,
            author: book.author,
        }
        .into_book();
        match ctx.storage.insert_book(&book).await {
            Ok(()) => written += 1,
            Err(StorageError::Duplicate(id)) => {
                info!(%id, "skipping duplicate seed entry");
            }
            Err(e) => return Err(storage_error(e)),
        }
    }
    Ok(written)
}

fn validate_id(id: &BookId) -> Result<(), ApiError> {
    if id.as_str().len() > MAX_ID_BYTES {
        return Err(ApiError::new(ErrorCode::Validation, "id is too long"));
    }
    if id.as_str().contains('/') || id.as_str().contains('\\') {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "id must not contain path separators",
        ));
    }
    Ok(())
}

fn validate_text(title: &str, author: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "title cannot be empty"));
    }
    if title.len() > MAX_TITLE_BYTES {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("title exceeds {MAX_TITLE_BYTES} bytes"),
        ));
    }
    if author.len() > MAX_AUTHOR_BYTES {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("author exceeds {MAX_AUTHOR_BYTES} bytes"),
        ));
    }
    Ok(())
}

fn not_found(id: &BookId) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("book {id} not found"))
}

fn storage_error(e: StorageError) -> ApiError {
    match e {
        StorageError::Duplicate(id) => {
            ApiError::new(ErrorCode::Conflict, format!("book {id} already exists"))
        }
        StorageError::Database(e) => {
            error!(error = %e, "book storage failure");
            ApiError::new(ErrorCode::Internal, e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
