//! # Workspace API
//!
//! Starter files, publishing a workspace to GitHub, and downloading it as
//! an archive. Push and export take files as a name→content map.

use std::collections::BTreeMap;

use autoflow_core::archive::{archive_file_name, ARCHIVE_CONTENT_TYPE};
use autoflow_core::{export_archive, FileSet, SourceFile};
use autoflow_github::GitHubClient;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

const MAX_PROJECT_NAME: usize = 100;
const MAX_COMMIT_MESSAGE: usize = 1000;

fn validate_project_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("project_name must not be empty".to_string());
    }
    if name.chars().count() > MAX_PROJECT_NAME {
        return Err(format!("project_name must not exceed {MAX_PROJECT_NAME} characters"));
    }
    Ok(())
}

fn validate_files(files: &BTreeMap<String, String>) -> Result<(), String> {
    if files.is_empty() {
        return Err("files must not be empty".to_string());
    }
    FileSet::from_map(files).validate().map_err(|e| e.to_string())
}

/// Publish request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PushRequest {
    pub project_name: String,
    pub files: BTreeMap<String, String>,
    #[serde(default)]
    pub commit_message: Option<String>,
    /// Project to record the repository and deploy URLs on.
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

impl Validate for PushRequest {
    fn validate(&self) -> Result<(), String> {
        validate_project_name(&self.project_name)?;
        if self
            .commit_message
            .as_ref()
            .is_some_and(|m| m.chars().count() > MAX_COMMIT_MESSAGE)
        {
            return Err(format!(
                "commit_message must not exceed {MAX_COMMIT_MESSAGE} characters"
            ));
        }
        validate_files(&self.files)
    }
}

/// Publish result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PushResponse {
    pub message: String,
    pub repository_url: String,
    pub deploy_url: String,
    pub commit_sha: String,
}

/// Export request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    pub project_name: String,
    pub files: BTreeMap<String, String>,
}

impl Validate for ExportRequest {
    fn validate(&self) -> Result<(), String> {
        validate_project_name(&self.project_name)?;
        validate_files(&self.files)
    }
}

/// Build the workspace router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/workspace/starter", get(starter_workspace))
        .route("/v1/push", post(push_workspace))
        .route("/v1/export", post(export_workspace))
}

fn require_github(state: &AppState) -> Result<&GitHubClient, AppError> {
    state.github.as_ref().ok_or_else(|| {
        AppError::service_unavailable(
            "GitHub publishing not configured. Set GITHUB_TOKEN and GITHUB_OWNER environment variables.",
        )
    })
}

/// GET /v1/workspace/starter: The default workspace.
#[utoipa::path(
    get,
    path = "/v1/workspace/starter",
    responses(
        (status = 200, description = "Starter files", body = Vec<SourceFile>),
    ),
    tag = "workspace"
)]
pub async fn starter_workspace() -> Json<FileSet> {
    Json(FileSet::starter())
}

/// POST /v1/push: Commit the files to GitHub and return the Pages URL.
#[utoipa::path(
    post,
    path = "/v1/push",
    request_body = PushRequest,
    responses(
        (status = 200, description = "Published", body = PushResponse),
        (status = 404, description = "Unknown project", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
        (status = 502, description = "GitHub rejected the request", body = crate::error::ErrorBody),
        (status = 503, description = "GitHub not configured", body = crate::error::ErrorBody),
    ),
    tag = "workspace"
)]
pub async fn push_workspace(
    State(state): State<AppState>,
    body: Result<Json<PushRequest>, JsonRejection>,
) -> Result<Json<PushResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let github = require_github(&state)?;
    if let Some(project_id) = req.project_id {
        if !state.projects.contains(&project_id) {
            return Err(AppError::not_found("project", project_id));
        }
    }

    let files = FileSet::from_map(&req.files);
    let outcome = github
        .publish(
            req.project_name.trim(),
            &files,
            req.commit_message.as_deref().unwrap_or_default(),
        )
        .await?;

    if let Some(project_id) = req.project_id {
        let updated = state.projects.update(&project_id, |project| {
            project.github_url = Some(outcome.repository_url.clone());
            project.deploy_url = Some(outcome.deploy_url.clone());
            project.updated_at = Utc::now();
        });
        if let (Some(pool), Some(record)) = (&state.db_pool, &updated) {
            if let Err(e) = crate::db::projects::update_publication(pool, record).await {
                tracing::error!(project_id = %project_id, error = %e, "failed to persist project publication to database");
                return Err(AppError::Internal(
                    "publication recorded in-memory but database persist failed".to_string(),
                ));
            }
        }
    }

    Ok(Json(PushResponse {
        message: format!("Published {} to {}", req.project_name.trim(), outcome.full_name),
        repository_url: outcome.repository_url,
        deploy_url: outcome.deploy_url,
        commit_sha: outcome.commit_sha,
    }))
}

/// POST /v1/export: Download the files as a `.tar.gz` archive.
#[utoipa::path(
    post,
    path = "/v1/export",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Gzip-compressed tar archive", content_type = "application/gzip", body = Vec<u8>),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "workspace"
)]
pub async fn export_workspace(
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = extract_validated_json(body)?;
    let name = req.project_name.trim();
    let bytes = export_archive(name, &FileSet::from_map(&req.files))?;
    let disposition = format!("attachment; filename=\"{}\"", archive_file_name(name));

    Ok((
        [
            (header::CONTENT_TYPE, ARCHIVE_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
