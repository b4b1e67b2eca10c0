//! # Projects API
//!
//! Saved workspaces. Files travel as a name→content map; languages are
//! inferred from file names. Technologies default to the ones implied by
//! the files when the client does not list any.

use std::collections::BTreeMap;

use autoflow_core::{infer_technologies, FileSet};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, optional_text, Validate};
use crate::routes::preview::render_files;
use crate::routes::users::require_user;
use crate::state::{AppState, ProjectRecord};

const MAX_NAME: usize = 100;
const MAX_DESCRIPTION: usize = 500;
const MAX_TECHNOLOGIES: usize = 20;

/// Create project request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// File name to content. Missing means the starter workspace.
    #[serde(default)]
    pub files: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl CreateProjectRequest {
    fn file_set(&self) -> FileSet {
        match &self.files {
            Some(map) => FileSet::from_map(map),
            None => FileSet::starter(),
        }
    }
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        if name.chars().count() > MAX_NAME {
            return Err(format!("name must not exceed {MAX_NAME} characters"));
        }
        optional_text(&self.description, "description", MAX_DESCRIPTION)?;
        if self.technologies.len() > MAX_TECHNOLOGIES {
            return Err(format!("at most {MAX_TECHNOLOGIES} technologies are allowed"));
        }
        if self.technologies.iter().any(|t| t.trim().is_empty()) {
            return Err("technologies must not contain empty entries".to_string());
        }
        self.file_set().validate().map_err(|e| e.to_string())
    }
}

/// Replace project files request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateFilesRequest {
    pub files: BTreeMap<String, String>,
}

impl Validate for UpdateFilesRequest {
    fn validate(&self) -> Result<(), String> {
        FileSet::from_map(&self.files)
            .validate()
            .map_err(|e| e.to_string())
    }
}

/// Build the projects router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/projects", post(create_project))
        .route("/v1/projects/{id}", get(get_project))
        .route("/v1/projects/{id}/files", put(update_project_files))
        .route("/v1/projects/{id}/preview", get(project_preview))
}

fn require_project(state: &AppState, id: Uuid) -> Result<ProjectRecord, AppError> {
    state
        .projects
        .get(&id)
        .ok_or_else(|| AppError::not_found("project", id))
}

/// POST /v1/projects: Create a project.
#[utoipa::path(
    post,
    path = "/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectRecord),
        (status = 404, description = "Unknown user", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    body: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProjectRecord>), AppError> {
    let req = extract_validated_json(body)?;
    require_user(&state, req.user_id)?;

    let files = req.file_set();
    let technologies = if req.technologies.is_empty() {
        infer_technologies(&files)
    } else {
        req.technologies.iter().map(|t| t.trim().to_string()).collect()
    };

    let id = Uuid::new_v4();
    let now = Utc::now();
    let record = ProjectRecord {
        id,
        user_id: req.user_id,
        name: req.name.trim().to_string(),
        description: optional_text(&req.description, "description", MAX_DESCRIPTION)
            .map_err(AppError::Validation)?,
        files: files.to_map(),
        github_url: None,
        deploy_url: None,
        technologies,
        created_at: now,
        updated_at: now,
    };

    state.projects.insert(id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::projects::insert(pool, &record).await {
            tracing::error!(project_id = %id, error = %e, "failed to persist project to database");
            return Err(AppError::Internal(
                "project recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(project_id = %id, user_id = %record.user_id, files = record.files.len(), "project created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/projects/{id}: Get a project.
#[utoipa::path(
    get,
    path = "/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = ProjectRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectRecord>, AppError> {
    require_project(&state, id).map(Json)
}

/// PUT /v1/projects/{id}/files: Replace a project's files.
///
/// Technologies are re-inferred from the new files.
#[utoipa::path(
    put,
    path = "/v1/projects/{id}/files",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateFilesRequest,
    responses(
        (status = 200, description = "Files replaced", body = ProjectRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid file set", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn update_project_files(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateFilesRequest>, JsonRejection>,
) -> Result<Json<ProjectRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let technologies = infer_technologies(&FileSet::from_map(&req.files));

    let record = state
        .projects
        .update(&id, |project| {
            project.files = req.files;
            project.technologies = technologies;
            project.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found("project", id))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::projects::update_files(pool, &record).await {
            tracing::error!(project_id = %id, error = %e, "failed to persist project files to database");
            return Err(AppError::Internal(
                "project files updated in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok(Json(record))
}

/// GET /v1/projects/{id}/preview: The project's composed preview.
#[utoipa::path(
    get,
    path = "/v1/projects/{id}/preview",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Composed document", content_type = "text/html", body = String),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "projects"
)]
pub async fn project_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let project = require_project(&state, id)?;
    Ok(render_files(&state, &project.file_set()))
}
