use super::*;
use axum::{
    body::{self, Body},
    http::{header, Request},
};
use tower::ServiceExt;

async fn test_app() -> (Router, Storage, tempfile::TempDir) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let static_dir = tempfile::tempdir().expect("static dir");
    std::fs::write(static_dir.path().join("style.css"), "body {}").expect("css");
    let app = build_router(
        Arc::new(AppState {
            api: ApiContext {
                storage: storage.clone(),
            },
        }),
        static_dir.path(),
    );
    (app, storage, static_dir)
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

fn json_request(method: &str, uri: &str, value: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .expect("request")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage, _static_dir) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"ok");
}

#[tokio::test]
async fn empty_store_serves_an_empty_json_array() {
    let (app, _storage, _static_dir) = test_app().await;
    let response = app
        .oneshot(Request::get("/books").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let books: Vec<Book> = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert!(books.is_empty());
}

#[tokio::test]
async fn create_then_list_preserves_order() {
    let (app, _storage, _static_dir) = test_app().await;
    for (id, title, author) in [("1", "T1", "A1"), ("2", "T2", "A2"), ("3", "T3", "A3")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/books",
                serde_json::json!({ "id": id, "title": title, "author": author }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(Request::get("/books").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let books: Vec<Book> = serde_json::from_slice(&body_bytes(response).await).expect("json");
    let ids: Vec<&str> = books.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(books[2], Book::new("3", "T3", "A3"));
}

#[tokio::test]
async fn duplicate_create_returns_conflict_envelope() {
    let (app, storage, _static_dir) = test_app().await;
    storage
        .insert_book(&Book::new("1", "T1", "A1"))
        .await
        .expect("seed");

    let response = app
        .oneshot(json_request(
            "POST",
            "/books",
            serde_json::json!({ "id": "1", "title": "T1", "author": "A1" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let err: ApiError = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn get_update_delete_single_book() {
    let (app, storage, _static_dir) = test_app().await;
    storage
        .insert_book(&Book::new("42", "Old", "Someone"))
        .await
        .expect("seed");

    let response = app
        .clone()
        .oneshot(Request::get("/books/42").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/books/42",
            serde_json::json!({ "title": "New", "author": "Someone" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let book: Book = serde_json::from_slice(&body_bytes(response).await).expect("json");
    assert_eq!(book, Book::new("42", "New", "Someone"));

    let response = app
        .clone()
        .oneshot(
            Request::delete("/books/42")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(Request::get("/books/42").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_of_missing_book_is_not_found() {
    let (app, _storage, _static_dir) = test_app().await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/books/missing",
            serde_json::json!({ "title": "T", "author": "A" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_title_is_a_bad_request() {
    let (app, _storage, _static_dir) = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/books",
            serde_json::json!({ "title": "", "author": "A" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn assert_validation_envelope(response: axum::response::Response, status: StatusCode) {
    assert_eq!(response.status(), status);
    let err: ApiError = serde_json::from_slice(&body_bytes(response).await).expect("json error");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn unparseable_body_gets_json_error() {
    let (app, _storage, _static_dir) = test_app().await;
    let request = Request::post("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_validation_envelope(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn missing_content_type_gets_json_error() {
    let (app, _storage, _static_dir) = test_app().await;
    let request = Request::post("/books")
        .body(Body::from(r#"{"title":"T","author":"A"}"#))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_validation_envelope(response, StatusCode::UNSUPPORTED_MEDIA_TYPE).await;
}

#[tokio::test]
async fn wrongly_typed_update_gets_json_error() {
    let (app, _storage, _static_dir) = test_app().await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/books/1",
            serde_json::json!({ "title": ["not", "text"], "author": "A" }),
        ))
        .await
        .expect("response");
    assert_validation_envelope(response, StatusCode::UNPROCESSABLE_ENTITY).await;
}

#[tokio::test]
async fn oversized_body_gets_json_error() {
    let (app, _storage, _static_dir) = test_app().await;
    let title = "x".repeat(MAX_BODY_BYTES + 1);
    let response = app
        .oneshot(json_request(
            "POST",
            "/books",
            serde_json::json!({ "title": title, "author": "A" }),
        ))
        .await
        .expect("response");
    assert_validation_envelope(response, StatusCode::PAYLOAD_TOO_LARGE).await;
}

#[tokio::test]
async fn index_page_hosts_the_book_list_container() {
    let (app, _storage, _static_dir) = test_app().await;
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).expect("utf8");
    assert!(html.contains(r#"id="book-list""#));
}

#[test]
fn index_imports_the_bundle_wasm_pack_emits() {
    let index = include_str!("../../static/index.html");
    assert!(index.contains(&format!("/static/{WEB_BUNDLE}")));

    // wasm-pack names the JS glue after the crate.
    let web_manifest = include_str!("../../../../apps/web/Cargo.toml");
    let bundle = FsPath::new(WEB_BUNDLE)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .expect("bundle stem");
    assert!(web_manifest.contains(&format!("name = \"{bundle}\"")));
}

#[tokio::test]
async fn built_bundle_is_served_under_static_pkg() {
    let (app, _storage, static_dir) = test_app().await;
    let bundle_path = static_dir.path().join(WEB_BUNDLE);
    std::fs::create_dir_all(bundle_path.parent().expect("pkg dir")).expect("mkdir");
    std::fs::write(&bundle_path, "export default function init() {}").expect("bundle");

    let response = app
        .oneshot(
            Request::get(format!("/static/{WEB_BUNDLE}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn static_files_are_served_from_configured_dir() {
    let (app, _storage, _static_dir) = test_app().await;
    let response = app
        .clone()
        .oneshot(
            Request::get("/static/style.css")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"body {}");

    let response = app
        .oneshot(
            Request::get("/static/missing.js")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
