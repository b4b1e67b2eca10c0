//! # Progress API
//!
//! Per-user tutorial progress. Step indices are checked against the
//! tutorial's lesson count; `current_step` only ever moves forward.

use autoflow_core::{OverallProgress, ProgressBook, TutorialId, TutorialProgress};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::users::require_user;
use crate::state::AppState;

/// What the learner just did.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressAction {
    /// Finished the lesson at zero-based `step`.
    Step { step: u32 },
    /// Finished the whole tutorial.
    Complete,
}

/// Record progress request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordProgressRequest {
    pub user_id: Uuid,
    pub tutorial_id: TutorialId,
    pub action: ProgressAction,
}

impl Validate for RecordProgressRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// A user's progress across tutorials.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub entries: Vec<TutorialProgress>,
    pub overall: OverallProgress,
}

/// Build the progress router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/progress", post(record_progress))
        .route("/v1/progress/{user_id}", get(get_progress))
}

/// GET /v1/progress/{user_id}: Entries and overall summary.
#[utoipa::path(
    get,
    path = "/v1/progress/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Progress summary", body = ProgressResponse),
        (status = 404, description = "Unknown user", body = crate::error::ErrorBody),
    ),
    tag = "progress"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, AppError> {
    require_user(&state, user_id)?;
    let book = state.progress.get(&user_id).unwrap_or_else(ProgressBook::new);
    Ok(Json(ProgressResponse {
        entries: book.entries().cloned().collect(),
        overall: book.overall(),
    }))
}

/// POST /v1/progress: Mark a step or a whole tutorial complete.
#[utoipa::path(
    post,
    path = "/v1/progress",
    request_body = RecordProgressRequest,
    responses(
        (status = 200, description = "Updated entry", body = TutorialProgress),
        (status = 404, description = "Unknown user or tutorial", body = crate::error::ErrorBody),
        (status = 422, description = "Step out of range", body = crate::error::ErrorBody),
    ),
    tag = "progress"
)]
pub async fn record_progress(
    State(state): State<AppState>,
    body: Result<Json<RecordProgressRequest>, JsonRejection>,
) -> Result<Json<TutorialProgress>, AppError> {
    let req = extract_validated_json(body)?;
    require_user(&state, req.user_id)?;

    match req.action {
        ProgressAction::Step { step } => {
            state.catalog.check_step(req.tutorial_id.as_str(), step)?;
        }
        ProgressAction::Complete => {
            if state.catalog.get(req.tutorial_id.as_str()).is_none() {
                return Err(AppError::not_found("tutorial", &req.tutorial_id));
            }
        }
    }

    let entry = state.progress.upsert_with(req.user_id, |book| {
        let entry = match req.action {
            ProgressAction::Step { step } => book.mark_step_complete(&req.tutorial_id, step),
            ProgressAction::Complete => book.mark_tutorial_complete(&req.tutorial_id, Utc::now()),
        };
        entry.clone()
    });

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::progress::upsert(pool, req.user_id, &entry).await {
            tracing::error!(user_id = %req.user_id, error = %e, "failed to persist progress to database");
            return Err(AppError::Internal(
                "progress recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::debug!(
        user_id = %req.user_id,
        tutorial = %req.tutorial_id,
        current_step = entry.current_step,
        completed = entry.completed,
        "progress recorded"
    );
    Ok(Json(entry))
}
