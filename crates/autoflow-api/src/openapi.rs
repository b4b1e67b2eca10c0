//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AutoFlow Learn API",
        version = "0.1.0",
        description = "Tutorials, progress, achievements, projects, live preview, GitHub publishing, and archive export for AutoFlow Learn.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Tutorials
        crate::routes::tutorials::list_tutorials,
        crate::routes::tutorials::list_categories,
        crate::routes::tutorials::get_tutorial,
        crate::routes::tutorials::load_lesson_workspace,
        // Users
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        crate::routes::users::get_achievements,
        crate::routes::users::list_user_projects,
        // Progress
        crate::routes::progress::get_progress,
        crate::routes::progress::record_progress,
        // Projects
        crate::routes::projects::create_project,
        crate::routes::projects::get_project,
        crate::routes::projects::update_project_files,
        crate::routes::projects::project_preview,
        // Preview
        crate::routes::preview::preview,
        crate::routes::preview::render_preview,
        crate::routes::preview::frame_preview,
        // Workspace
        crate::routes::workspace::starter_workspace,
        crate::routes::workspace::push_workspace,
        crate::routes::workspace::export_workspace,
        // Operations
        crate::routes::metrics::get_metrics,
    ),
    components(schemas(
        // Domain types
        autoflow_core::SourceFile,
        autoflow_core::Language,
        autoflow_core::Tutorial,
        autoflow_core::Lesson,
        autoflow_core::Difficulty,
        autoflow_core::CategoryCount,
        autoflow_core::TutorialProgress,
        autoflow_core::OverallProgress,
        autoflow_core::AchievementId,
        autoflow_core::AchievementStatus,
        autoflow_preview::PreviewMode,
        // State record types
        crate::state::UserRecord,
        crate::state::ProjectRecord,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // DTOs
        crate::routes::tutorials::TutorialSummary,
        crate::routes::tutorials::TutorialDetail,
        crate::routes::tutorials::LessonWorkspaceRequest,
        crate::routes::tutorials::LessonWorkspaceResponse,
        crate::routes::users::CreateUserRequest,
        crate::routes::progress::ProgressAction,
        crate::routes::progress::RecordProgressRequest,
        crate::routes::progress::ProgressResponse,
        crate::routes::projects::CreateProjectRequest,
        crate::routes::projects::UpdateFilesRequest,
        crate::routes::preview::PreviewRequest,
        crate::routes::preview::PreviewResponse,
        crate::routes::workspace::PushRequest,
        crate::routes::workspace::PushResponse,
        crate::routes::workspace::ExportRequest,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    tags(
        (name = "tutorials", description = "Tutorial catalog"),
        (name = "users", description = "Learner accounts and achievements"),
        (name = "progress", description = "Tutorial progress"),
        (name = "projects", description = "Saved workspaces"),
        (name = "preview", description = "Live preview composition"),
        (name = "workspace", description = "Starter files, GitHub publishing, and export"),
        (name = "operations", description = "Service counters"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
