//! # Users API
//!
//! Learner accounts, their achievements, and their saved projects.
//! Passwords are not stored; every route sits behind the service token.

use autoflow_core::{evaluate_achievements, AchievementStatus, ProgressBook, Username};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, optional_text, Validate};
use crate::state::{AppState, ProjectRecord, UserRecord};

const MAX_DISPLAY_NAME: usize = 100;

/// Create user request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// 3-39 characters of `[A-Za-z0-9_-]`.
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub github_username: Option<String>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), String> {
        Username::new(self.username.as_str()).map_err(|e| e.to_string())?;
        optional_text(&self.display_name, "display_name", MAX_DISPLAY_NAME)?;
        if let Some(github) = self.github_username.as_deref().map(str::trim) {
            if !github.is_empty() {
                Username::new(github).map_err(|_| format!("invalid github_username \"{github}\""))?;
            }
        }
        Ok(())
    }
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(create_user))
        .route("/v1/users/{id}", get(get_user))
        .route("/v1/users/{id}/achievements", get(get_achievements))
        .route("/v1/users/{id}/projects", get(list_user_projects))
}

/// Look up a user or fail with 404.
pub(crate) fn require_user(state: &AppState, id: Uuid) -> Result<UserRecord, AppError> {
    state
        .users
        .get(&id)
        .ok_or_else(|| AppError::not_found("user", id))
}

/// POST /v1/users: Create a user.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserRecord),
        (status = 409, description = "Username taken", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRecord>), AppError> {
    let req = extract_validated_json(body)?;
    let username = Username::new(req.username)?;
    let github_username = req
        .github_username
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());

    let id = Uuid::new_v4();
    let record = UserRecord {
        id,
        display_name: optional_text(&req.display_name, "display_name", MAX_DISPLAY_NAME)
            .map_err(AppError::Validation)?,
        github_username,
        username,
        created_at: Utc::now(),
    };

    let canonical = record.username.canonical();
    if !state
        .users
        .insert_unless(id, record.clone(), |u| u.username.canonical() == canonical)
    {
        return Err(AppError::Conflict(format!(
            "username \"{}\" is already taken",
            record.username
        )));
    }

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::users::insert(pool, &record).await {
            tracing::error!(user_id = %id, error = %e, "failed to persist user to database");
            return Err(AppError::Internal(
                "user recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(user_id = %id, username = %record.username, "user created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /v1/users/{id}: Get a user.
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRecord>, AppError> {
    require_user(&state, id).map(Json)
}

/// GET /v1/users/{id}/achievements: Every achievement with its earned flag.
#[utoipa::path(
    get,
    path = "/v1/users/{id}/achievements",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Achievement list", body = Vec<AchievementStatus>),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub async fn get_achievements(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AchievementStatus>>, AppError> {
    require_user(&state, id)?;
    let progress = state.progress.get(&id).unwrap_or_else(ProgressBook::new);
    let has_deployment = state
        .projects_of(id)
        .iter()
        .any(|p| p.deploy_url.is_some());
    Ok(Json(evaluate_achievements(
        &progress,
        &state.catalog,
        has_deployment,
    )))
}

/// GET /v1/users/{id}/projects: A user's projects, newest first.
#[utoipa::path(
    get,
    path = "/v1/users/{id}/projects",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Projects, newest first", body = Vec<ProjectRecord>),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
pub async fn list_user_projects(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProjectRecord>>, AppError> {
    require_user(&state, id)?;
    Ok(Json(state.projects_of(id)))
}
