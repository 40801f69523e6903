use std::{net::SocketAddr, path::Path as FsPath, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use shared::{
    domain::{Book, BookId},
    error::{ApiError, ErrorCode},
    protocol::{BookUpdate, NewBook},
};
use storage::Storage;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_BODY_BYTES: usize = 64 * 1024;
/// Browser bundle the index page imports, relative to the static dir.
/// Produced by `wasm-pack build apps/web --target web --out-dir ../../crates/server/static/pkg`.
const WEB_BUNDLE: &str = "pkg/bookshelf_web.js";

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let ctx = ApiContext { storage };

    if let Some(seed_path) = &settings.seed_path {
        let raw = tokio::fs::read_to_string(seed_path)
            .await
            .with_context(|| format!("failed to read seed file '{}'", seed_path.display()))?;
        let books: Vec<Book> = serde_json::from_str(&raw)
            .with_context(|| format!("seed file '{}' is not a JSON array of books", seed_path.display()))?;
        let written = api::seed_books(&ctx, books)
            .await
            .map_err(|e| anyhow::anyhow!("seeding failed: {}", e.message))?;
        info!(written, path = %seed_path.display(), "seeded book store");
    }

    if !settings.static_dir.is_dir() {
        warn!(
            static_dir = %settings.static_dir.display(),
            "static directory is missing; /static requests will 404"
        );
    } else if !settings.static_dir.join(WEB_BUNDLE).is_file() {
        warn!(
            bundle = %settings.static_dir.join(WEB_BUNDLE).display(),
            "browser bundle is missing; build apps/web with wasm-pack to enable the book list"
        );
    }

    let app = build_router(Arc::new(AppState { api: ctx }), &settings.static_dir);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/", get(show_index))
        .route("/healthz", get(healthz))
        .route("/books", get(http_list_books).post(http_create_book))
        .route(
            "/books/:id",
            get(http_get_book)
                .put(http_update_book)
                .delete(http_delete_book),
        )
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err))
}

/// Body extraction failures keep axum's status but use the JSON envelope.
fn reject_body(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    let status = rejection.status();
    warn!(%status, error = %rejection.body_text(), "rejected request body");
    (
        status,
        Json(ApiError::new(ErrorCode::Validation, rejection.body_text())),
    )
}

async fn show_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            error!(%error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
        }
    }
}

async fn http_list_books(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Book>>> {
    let books = api::list_books(&state.api).await.map_err(reject)?;
    Ok(Json(books))
}

async fn http_get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Book>> {
    let book = api::get_book(&state.api, &BookId(id))
        .await
        .map_err(reject)?;
    Ok(Json(book))
}

async fn http_create_book(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewBook>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let Json(req) = body.map_err(reject_body)?;
    let book = api::create_book(&state.api, req).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn http_update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<BookUpdate>, JsonRejection>,
) -> ApiResult<Json<Book>> {
    let Json(req) = body.map_err(reject_body)?;
    let book = api::update_book(&state.api, BookId(id), req)
        .await
        .map_err(reject)?;
    Ok(Json(book))
}

async fn http_delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    api::delete_book(&state.api, &BookId(id))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
