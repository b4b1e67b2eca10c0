//! # Tutorial Catalog API
//!
//! Read-only access to the tutorial catalog, plus loading a lesson's code
//! example into the learner's workspace.

use autoflow_core::{CategoryCount, Difficulty, FileSet, Lesson, SourceFile, Tutorial, TutorialId};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Catalog listing filter.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TutorialQuery {
    /// Exact category name. `All` or absent means no filter.
    #[serde(default)]
    pub category: Option<String>,
}

/// Tutorial without its lesson bodies.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TutorialSummary {
    pub id: TutorialId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration: u32,
    pub icon: String,
    pub color: String,
    pub order: u32,
    pub lesson_count: usize,
}

impl From<&Tutorial> for TutorialSummary {
    fn from(t: &Tutorial) -> Self {
        Self {
            id: t.id.clone(),
            title: t.title.clone(),
            description: t.description.clone(),
            category: t.category.clone(),
            difficulty: t.difficulty,
            duration: t.duration,
            icon: t.icon.clone(),
            color: t.color.clone(),
            order: t.order,
            lesson_count: t.lesson_count(),
        }
    }
}

/// Tutorial with lessons.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TutorialDetail {
    #[serde(flatten)]
    pub tutorial: Tutorial,
    pub lesson_count: usize,
}

/// Workspace to load a lesson into.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LessonWorkspaceRequest {
    /// Current workspace files. Missing means the starter workspace.
    #[serde(default = "FileSet::starter")]
    #[schema(value_type = Vec<SourceFile>)]
    pub files: FileSet,
}

impl Validate for LessonWorkspaceRequest {
    fn validate(&self) -> Result<(), String> {
        self.files.validate().map_err(|e| e.to_string())
    }
}

/// The workspace after loading the lesson's code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LessonWorkspaceResponse {
    pub tutorial_id: TutorialId,
    pub step: u32,
    pub lesson: Lesson,
    /// File that received the code example, if the lesson has one.
    pub loaded_file: Option<String>,
    /// How far through the tutorial this lesson is, as shown in its header.
    pub step_percentage: f64,
    #[schema(value_type = Vec<SourceFile>)]
    pub files: FileSet,
}

/// Build the tutorials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/tutorials", get(list_tutorials))
        .route("/v1/tutorials/categories", get(list_categories))
        .route("/v1/tutorials/{id}", get(get_tutorial))
        .route(
            "/v1/tutorials/{id}/lessons/{step}/workspace",
            post(load_lesson_workspace),
        )
}

/// GET /v1/tutorials: List tutorials in catalog order.
#[utoipa::path(
    get,
    path = "/v1/tutorials",
    params(TutorialQuery),
    responses(
        (status = 200, description = "Tutorials in catalog order", body = Vec<TutorialSummary>),
    ),
    tag = "tutorials"
)]
pub async fn list_tutorials(
    State(state): State<AppState>,
    Query(query): Query<TutorialQuery>,
) -> Json<Vec<TutorialSummary>> {
    Json(
        state
            .catalog
            .filter_by_category(query.category.as_deref())
            .into_iter()
            .map(TutorialSummary::from)
            .collect(),
    )
}

/// GET /v1/tutorials/categories: Categories with tutorial counts.
#[utoipa::path(
    get,
    path = "/v1/tutorials/categories",
    responses(
        (status = 200, description = "Categories in first-appearance order", body = Vec<CategoryCount>),
    ),
    tag = "tutorials"
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<CategoryCount>> {
    Json(state.catalog.categories())
}

/// GET /v1/tutorials/{id}: Tutorial with lessons.
#[utoipa::path(
    get,
    path = "/v1/tutorials/{id}",
    params(("id" = String, Path, description = "Tutorial slug")),
    responses(
        (status = 200, description = "Tutorial found", body = TutorialDetail),
        (status = 404, description = "Unknown tutorial", body = crate::error::ErrorBody),
    ),
    tag = "tutorials"
)]
pub async fn get_tutorial(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TutorialDetail>, AppError> {
    let tutorial = state
        .catalog
        .get(&id)
        .ok_or_else(|| AppError::not_found("tutorial", &id))?;
    Ok(Json(TutorialDetail {
        lesson_count: tutorial.lesson_count(),
        tutorial: tutorial.clone(),
    }))
}

/// POST /v1/tutorials/{id}/lessons/{step}/workspace: Load lesson code.
///
/// The code example replaces the file named after the lesson language's
/// default file (e.g. `commands.sh`, `workflow.yml`), or is appended.
#[utoipa::path(
    post,
    path = "/v1/tutorials/{id}/lessons/{step}/workspace",
    params(
        ("id" = String, Path, description = "Tutorial slug"),
        ("step" = u32, Path, description = "Zero-based lesson index"),
    ),
    request_body = LessonWorkspaceRequest,
    responses(
        (status = 200, description = "Workspace with the lesson code loaded", body = LessonWorkspaceResponse),
        (status = 404, description = "Unknown tutorial", body = crate::error::ErrorBody),
        (status = 422, description = "Step out of range or invalid files", body = crate::error::ErrorBody),
    ),
    tag = "tutorials"
)]
pub async fn load_lesson_workspace(
    State(state): State<AppState>,
    Path((id, step)): Path<(String, u32)>,
    body: Result<Json<LessonWorkspaceRequest>, JsonRejection>,
) -> Result<Json<LessonWorkspaceResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let tutorial = state.catalog.check_step(&id, step)?;
    let lesson = tutorial
        .lesson(step)
        .ok_or_else(|| AppError::Internal(format!("lesson {step} of {id} vanished")))?;

    let mut files = req.files;
    let loaded_file = lesson
        .code_example
        .as_ref()
        .map(|code| files.load_snippet(lesson.language, code.clone()).to_string());
    files.validate()?;

    Ok(Json(LessonWorkspaceResponse {
        tutorial_id: tutorial.id.clone(),
        step,
        lesson: lesson.clone(),
        loaded_file,
        step_percentage: tutorial.step_percentage(step),
        files,
    }))
}
