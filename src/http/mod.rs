use crate::auth::{AuthError, AUTH_HEADER};
use crate::catalog::CatalogError;
use crate::handler::Handler;
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

mod pages;

/// Uploads are buffered in memory; anything larger is rejected up front.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Rendering context for pages that emit absolute links (downloads, QR
/// codes). An empty base URL falls back to relative links.
#[derive(Debug, Clone, Default)]
pub struct SiteContext {
    pub public_base_url: String,
}

/// HTTP surface over [`Handler`]: the public catalog views plus the four
/// authorized mutations.
#[derive(Clone)]
pub struct CatalogHttp {
    handler: Arc<Handler>,
    site: Arc<SiteContext>,
}

impl CatalogHttp {
    pub fn new(handler: Handler) -> Self {
        Self::new_with_context(handler, SiteContext::default())
    }

    pub fn new_with_context(handler: Handler, site: SiteContext) -> Self {
        Self {
            handler: Arc::new(handler),
            site: Arc::new(site),
        }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(landing))
            .route("/all", get(all_files))
            .route("/manage", get(manage))
            .route("/healthz", get(healthz))
            .route("/files/:filename", get(download))
            .route("/manage/upload", post(upload))
            .route("/manage/remove", post(remove))
            .route("/manage/replace", post(replace))
            .route("/manage/select", post(select))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .with_state(self)
    }

    /// GET routes are public; everything else comes through here first.
    async fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let credential = headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok());
        self.handler.auth.authorize(credential).await?;
        Ok(())
    }
}

#[derive(Debug)]
enum ApiError {
    MissingCredentials,
    InvalidCredentials,
    Validation(String),
    NotFound(String),
    Conflict,
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::MissingCredentials => ApiError::MissingCredentials,
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(m) => ApiError::Validation(m),
            CatalogError::Conflict => ApiError::Conflict,
            CatalogError::CorruptIndex(m) | CatalogError::Internal(m) => ApiError::Internal(m),
            CatalogError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            ApiError::InvalidCredentials => {
                (StatusCode::FORBIDDEN, "Invalid credentials").into_response()
            }
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, m).into_response(),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m).into_response(),
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                "Catalog was updated concurrently, try again",
            )
                .into_response(),
            ApiError::Internal(m) => {
                tracing::error!(error = %m, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, m).into_response()
            }
        }
    }
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Validation(format!("malformed multipart body: {e}"))
}

#[derive(Deserialize)]
struct FilenameBody {
    filename: String,
}

/// GET / - landing page with the currently selected file
async fn landing(State(ctx): State<CatalogHttp>) -> Result<Html<String>, ApiError> {
    let entries = ctx.handler.registry.list().await?;
    let selected = entries.iter().find(|e| e.selected);
    Ok(Html(pages::landing(selected, &ctx.site)))
}

/// GET /all - every catalog entry, newest first
async fn all_files(State(ctx): State<CatalogHttp>) -> Result<Html<String>, ApiError> {
    let mut entries = ctx.handler.registry.list().await?;
    entries.reverse();
    Ok(Html(pages::all_files(&entries, &ctx.site)))
}

/// GET /manage - management console
async fn manage(State(ctx): State<CatalogHttp>) -> Result<Html<String>, ApiError> {
    let entries = ctx.handler.registry.list().await?;
    Ok(Html(pages::manage(&entries)))
}

/// GET /healthz - liveness probe
async fn healthz() -> &'static str {
    "ok"
}

/// GET /files/{filename} - blob download
async fn download(
    State(ctx): State<CatalogHttp>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let (data, meta) = ctx
        .handler
        .registry
        .open(&filename)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no such file: {filename}")))?;

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/octet-stream".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::ETAG, meta.etag),
        ],
        Body::from(data),
    )
        .into_response())
}

/// POST /manage/upload - multipart `file` + `displayName`
async fn upload(
    State(ctx): State<CatalogHttp>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    ctx.authorize(&headers).await?;

    let mut file = None;
    let mut display_name = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let original = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(bad_multipart)?;
                file = Some((original, data));
            }
            Some("displayName") => {
                display_name = Some(field.text().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    let (original, data) =
        file.ok_or_else(|| ApiError::Validation("file is required".into()))?;
    let display_name =
        display_name.ok_or_else(|| ApiError::Validation("display name is required".into()))?;

    let entry = ctx
        .handler
        .registry
        .upload(data, &original, &display_name)
        .await?;
    Ok((StatusCode::OK, Json(entry)))
}

/// POST /manage/remove - JSON `{ "filename" }`
async fn remove(
    State(ctx): State<CatalogHttp>,
    headers: HeaderMap,
    Json(body): Json<FilenameBody>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.authorize(&headers).await?;
    let removed = ctx.handler.registry.remove(&body.filename).await?;
    Ok((StatusCode::OK, format!("{{\"removed\": {removed}}}")))
}

/// POST /manage/replace - multipart `newFile` + `filename`
async fn replace(
    State(ctx): State<CatalogHttp>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    ctx.authorize(&headers).await?;

    let mut filename = None;
    let mut data = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("filename") => {
                filename = Some(field.text().await.map_err(bad_multipart)?);
            }
            Some("newFile") => {
                data = Some(field.bytes().await.map_err(bad_multipart)?);
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::Validation("filename is required".into()))?;
    let data = data.ok_or_else(|| ApiError::Validation("replacement file is required".into()))?;

    ctx.handler.registry.replace(&filename, data).await?;
    Ok((StatusCode::OK, "File replaced"))
}

/// POST /manage/select - JSON `{ "filename" }`
async fn select(
    State(ctx): State<CatalogHttp>,
    headers: HeaderMap,
    Json(body): Json<FilenameBody>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.authorize(&headers).await?;
    let hit = ctx.handler.registry.select(&body.filename).await?;
    Ok((StatusCode::OK, format!("{{\"selected\": {hit}}}")))
}
