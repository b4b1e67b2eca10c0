//! # Live Preview API
//!
//! Stateless composition of a posted workspace into one HTML document.
//!
//! | Route | Response |
//! |-------|----------|
//! | `POST /v1/preview` | JSON document plus composition metadata |
//! | `POST /v1/preview/render` | the document itself as `text/html` |
//! | `POST /v1/preview/frame` | host page embedding it in a sandboxed iframe |
//!
//! Raw HTML responses carry the content policy as a header together with a
//! `sandbox allow-scripts` directive, so a browser opening the URL directly
//! still treats the document as an opaque origin.

use autoflow_core::{FileSet, SourceFile};
use autoflow_preview::{PreviewMode, SandboxPolicy};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

const FRAME_TITLE: &str = "Live Preview";

/// Workspace to compose.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewRequest {
    #[serde(default)]
    #[schema(value_type = Vec<SourceFile>)]
    pub files: FileSet,
}

impl Validate for PreviewRequest {
    fn validate(&self) -> Result<(), String> {
        self.files.validate().map_err(|e| e.to_string())
    }
}

/// Composed document with metadata.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreviewResponse {
    pub html: String,
    pub mode: PreviewMode,
    /// Entry HTML file, absent in fallback mode.
    pub entry: Option<String>,
    pub inlined_styles: usize,
    pub inlined_scripts: usize,
    /// SHA-256 of the input files; also the `ETag` of raw responses.
    pub digest: String,
}

/// Build the preview router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/preview", post(preview))
        .route("/v1/preview/render", post(render_preview))
        .route("/v1/preview/frame", post(frame_preview))
}

/// A `text/html` response for an untrusted document.
///
/// `sandbox` adds the CSP `sandbox` directive; the framed host page leaves
/// it off because the iframe attribute already isolates the preview.
pub(crate) fn html_response(
    state: &AppState,
    html: String,
    digest: &str,
    sandbox: Option<&SandboxPolicy>,
) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_SECURITY_POLICY,
                state.composer.policy().header_value(sandbox),
            ),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (header::ETAG, format!("\"{digest}\"")),
        ],
        html,
    )
        .into_response()
}

/// Compose `files` and answer with the raw sandboxed document.
pub(crate) fn render_files(state: &AppState, files: &FileSet) -> Response {
    let document = state.composer.compose(files.as_slice());
    html_response(
        state,
        document.html,
        &files.digest(),
        Some(&SandboxPolicy::scripts_only()),
    )
}

/// POST /v1/preview: Compose and return the document as JSON.
#[utoipa::path(
    post,
    path = "/v1/preview",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Composed document", body = PreviewResponse),
        (status = 422, description = "Invalid file set", body = crate::error::ErrorBody),
    ),
    tag = "preview"
)]
pub async fn preview(
    State(state): State<AppState>,
    body: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<PreviewResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let document = state.composer.compose(req.files.as_slice());
    Ok(Json(PreviewResponse {
        html: document.html,
        mode: document.mode,
        entry: document.entry,
        inlined_styles: document.inlined_styles,
        inlined_scripts: document.inlined_scripts,
        digest: req.files.digest(),
    }))
}

/// POST /v1/preview/render: Compose and return the raw document.
#[utoipa::path(
    post,
    path = "/v1/preview/render",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Composed document", content_type = "text/html", body = String),
        (status = 422, description = "Invalid file set", body = crate::error::ErrorBody),
    ),
    tag = "preview"
)]
pub async fn render_preview(
    State(state): State<AppState>,
    body: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = extract_validated_json(body)?;
    Ok(render_files(&state, &req.files))
}

/// POST /v1/preview/frame: Host page with the preview in a sandboxed iframe.
#[utoipa::path(
    post,
    path = "/v1/preview/frame",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Host page", content_type = "text/html", body = String),
        (status = 422, description = "Invalid file set", body = crate::error::ErrorBody),
    ),
    tag = "preview"
)]
pub async fn frame_preview(
    State(state): State<AppState>,
    body: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = extract_validated_json(body)?;
    let document = state.composer.compose(req.files.as_slice());
    let page = SandboxPolicy::scripts_only().host_page(&document.html, FRAME_TITLE);
    Ok(html_response(&state, page, &req.files.digest(), None))
}
