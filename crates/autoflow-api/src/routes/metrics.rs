//! # Metrics API

use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::middleware::metrics::{ApiMetrics, MetricsSnapshot};
use crate::state::AppState;

/// Build the metrics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/metrics", get(get_metrics))
}

/// GET /v1/metrics: Request and error counters since startup.
#[utoipa::path(
    get,
    path = "/v1/metrics",
    responses(
        (status = 200, description = "Counters", body = MetricsSnapshot),
    ),
    tag = "operations"
)]
pub async fn get_metrics(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
