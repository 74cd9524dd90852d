use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use shelfd::auth::static_secret::StaticSecretAuthorizer;
use shelfd::auth::{Authorizer, AUTH_HEADER};
use shelfd::catalog::index::IndexRepository;
use shelfd::catalog::registry::FileRegistry;
use shelfd::catalog::FileEntry;
use shelfd::handler::Handler;
use shelfd::http::{CatalogHttp, SiteContext};
use shelfd::storage::in_memory::InMemoryStore;
use shelfd::storage::ObjectStore;
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "testpass";
const BOUNDARY: &str = "shelfd-test-boundary";

fn test_app() -> (Router, InMemoryStore) {
    let mem = InMemoryStore::new();
    let store: Arc<dyn ObjectStore> = Arc::new(mem.clone());
    let auth: Arc<dyn Authorizer> = Arc::new(StaticSecretAuthorizer::new(SECRET));
    let index = IndexRepository::new(store.clone(), "shelf/index.json");
    let registry = Arc::new(FileRegistry::new(store, index, "shelf/files"));
    let site = SiteContext {
        public_base_url: "http://localhost:8080".into(),
    };
    let app = CatalogHttp::new_with_context(Handler::new(auth, registry), site).router();
    (app, mem)
}

fn multipart_part(body: &mut Vec<u8>, name: &str, filename: Option<&str>, data: &[u8]) {
    let disposition = match filename {
        Some(f) => format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"),
        None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
    };
    body.extend_from_slice(format!("--{BOUNDARY}\r\n{disposition}\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
}

fn multipart_close(body: &mut Vec<u8>) {
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
}

fn upload_request(
    display_name: Option<&str>,
    file: Option<(&str, &[u8])>,
    with_secret: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(name) = display_name {
        multipart_part(&mut body, "displayName", None, name.as_bytes());
    }
    if let Some((filename, data)) = file {
        multipart_part(&mut body, "file", Some(filename), data);
    }
    multipart_close(&mut body);

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/manage/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(secret) = with_secret {
        builder = builder.header(AUTH_HEADER, secret);
    }
    builder.body(Body::from(body)).unwrap()
}

fn json_request(uri: &str, filename: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTH_HEADER, SECRET)
        .header("content-type", "application/json")
        .body(Body::from(format!("{{\"filename\":\"{filename}\"}}")))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&body).to_string())
}

async fn get_page(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

#[tokio::test]
async fn upload_select_remove_lifecycle() {
    let (app, _mem) = test_app();

    // empty catalog renders the fallback
    let (status, page) = get_page(app.clone(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("No file selected"));

    // upload
    let (status, body) = send(
        app.clone(),
        upload_request(Some("Lecture 1"), Some(("A.pdf", b"%PDF-1.4")), Some(SECRET)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "upload failed: {body}");
    let entry: FileEntry = serde_json::from_str(&body).unwrap();
    assert!(entry.filename.ends_with("_A.pdf"));
    assert!(!entry.selected);

    // still nothing selected
    let (_, page) = get_page(app.clone(), "/").await;
    assert!(page.contains("No file selected"));

    // the listing shows the entry
    let (_, page) = get_page(app.clone(), "/all").await;
    assert!(page.contains("Lecture 1"));

    // select it
    let (status, body) = send(app.clone(), json_request("/manage/select", &entry.filename)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"selected\": true}");

    let (_, page) = get_page(app.clone(), "/").await;
    assert!(page.contains("Lecture 1"));
    assert!(page.contains("api.qrserver.com"));

    // download
    let (status, body) = get_page(app.clone(), &format!("/files/{}", entry.filename)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "%PDF-1.4");

    // remove
    let (status, body) = send(app.clone(), json_request("/manage/remove", &entry.filename)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"removed\": 1}");

    let (_, page) = get_page(app.clone(), "/").await;
    assert!(page.contains("No file selected"));
    let (status, _) = get_page(app, &format!("/files/{}", entry.filename)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_without_credentials_mutates_nothing() {
    let (app, mem) = test_app();

    let (status, _) = send(
        app,
        upload_request(Some("Lecture 1"), Some(("A.pdf", b"data")), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(mem.keys().await.is_empty());
}

#[tokio::test]
async fn upload_with_wrong_secret_is_forbidden() {
    let (app, mem) = test_app();

    let (status, _) = send(
        app,
        upload_request(Some("Lecture 1"), Some(("A.pdf", b"data")), Some("wrong")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(mem.keys().await.is_empty());
}

#[tokio::test]
async fn upload_with_missing_fields_is_a_validation_error() {
    let (app, mem) = test_app();

    let (status, _) = send(
        app.clone(),
        upload_request(None, Some(("A.pdf", b"data")), Some(SECRET)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app, upload_request(Some("Lecture 1"), None, Some(SECRET))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(mem.keys().await.is_empty(), "no storage mutation on validation failure");
}

#[tokio::test]
async fn remove_of_unknown_filename_reports_zero() {
    let (app, _mem) = test_app();
    let (status, body) = send(app, json_request("/manage/remove", "1234_ghost.pdf")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"removed\": 0}");
}

#[tokio::test]
async fn select_of_unknown_filename_deselects_all() {
    let (app, _mem) = test_app();

    let (_, body) = send(
        app.clone(),
        upload_request(Some("Lecture 1"), Some(("A.pdf", b"data")), Some(SECRET)),
    )
    .await;
    let entry: FileEntry = serde_json::from_str(&body).unwrap();
    send(app.clone(), json_request("/manage/select", &entry.filename)).await;

    let (status, body) = send(app.clone(), json_request("/manage/select", "1234_ghost.pdf")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"selected\": false}");

    let (_, page) = get_page(app, "/").await;
    assert!(page.contains("No file selected"));
}

#[tokio::test]
async fn replace_swaps_content_and_preserves_the_index() {
    let (app, mem) = test_app();

    let (_, body) = send(
        app.clone(),
        upload_request(Some("Lecture 1"), Some(("A.pdf", b"v1")), Some(SECRET)),
    )
    .await;
    let entry: FileEntry = serde_json::from_str(&body).unwrap();
    let (index_before, _) = mem.get("shelf/index.json").await.unwrap().unwrap();

    let mut replace_body = Vec::new();
    multipart_part(&mut replace_body, "filename", None, entry.filename.as_bytes());
    multipart_part(&mut replace_body, "newFile", Some("A.pdf"), b"v2");
    multipart_close(&mut replace_body);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/manage/replace")
        .header(AUTH_HEADER, SECRET)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(replace_body))
        .unwrap();
    let (status, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);

    let (index_after, _) = mem.get("shelf/index.json").await.unwrap().unwrap();
    assert_eq!(index_before, index_after);

    let (status, body) = get_page(app, &format!("/files/{}", entry.filename)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "v2");
}

#[tokio::test]
async fn manage_page_lists_entries() {
    let (app, _mem) = test_app();

    send(
        app.clone(),
        upload_request(Some("Sheet 3"), Some(("sheet3.pdf", b"data")), Some(SECRET)),
    )
    .await;

    let (status, page) = get_page(app, "/manage").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Sheet 3"));
    assert!(page.contains("upload-form"));
}
