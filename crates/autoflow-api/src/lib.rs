//! # autoflow-api: HTTP Service for AutoFlow Learn
//!
//! Serves the tutorial catalog, per-user progress and achievements, saved
//! projects, the live-preview composer, GitHub publishing, and archive
//! export.
//!
//! ## API Surface
//!
//! | Prefix                 | Module                  | Domain              |
//! |------------------------|-------------------------|---------------------|
//! | `/v1/tutorials/*`      | [`routes::tutorials`]   | Tutorial catalog    |
//! | `/v1/users/*`          | [`routes::users`]       | Accounts, achievements |
//! | `/v1/progress/*`       | [`routes::progress`]    | Tutorial progress   |
//! | `/v1/projects/*`       | [`routes::projects`]    | Saved workspaces    |
//! | `/v1/preview/*`        | [`routes::preview`]     | Live preview        |
//! | `/v1/workspace/*`, `/v1/push`, `/v1/export` | [`routes::workspace`] | Starter, publish, export |
//! | `/v1/metrics`          | [`routes::metrics`]     | Counters            |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → RateLimitMiddleware → Handler
//! ```
//!
//! ## OpenAPI
//!
//! Generated via utoipa derive macros at `/openapi.json`.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::middleware::rate_limit::RateLimiter;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let limiter = RateLimiter::new(state.config.rate_limit());

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::tutorials::router())
        .merge(routes::users::router())
        .merge(routes::progress::router())
        .merge(routes::projects::router())
        .merge(routes::preview::router())
        .merge(routes::workspace::router())
        .merge(routes::metrics::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .layer(axum::Extension(limiter))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe: always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the router is serving.
async fn readiness() -> &'static str {
    "ready"
}
