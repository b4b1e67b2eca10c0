//! # Bearer Token Authentication
//!
//! A single shared service token guards every `/v1` route and the OpenAPI
//! document. Health probes are mounted outside this middleware.
//!
//! ```text
//! Authorization: Bearer {AUTH_TOKEN}
//! ```
//!
//! When `AUTH_TOKEN` is unset, authentication is disabled and every request
//! passes through (development mode).

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use crate::error::ErrorBody;

// ── Auth Configuration ──────────────────────────────────────────────────────

/// Auth configuration injected into request extensions.
///
/// Custom `Debug` redacts the token value.
#[derive(Clone)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Constant-time comparison of bearer tokens.
///
/// When lengths differ, performs a dummy comparison so the timing does not
/// depend on where the mismatch is.
fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Extract and check the Bearer token from the Authorization header.
pub async fn auth_middleware(request: Request, next: Next) -> Response {
    let expected_token = request.extensions().get::<AuthConfig>().cloned();

    let Some(AuthConfig {
        token: Some(expected),
    }) = expected_token
    else {
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header.map(|value| value.strip_prefix("Bearer ")) {
        Some(Some(provided)) if constant_time_token_eq(provided, &expected) => {
            next.run(request).await
        }
        Some(Some(_)) => {
            tracing::warn!("authentication failed: invalid bearer token");
            unauthorized_response("invalid bearer token")
        }
        Some(None) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            unauthorized_response("authorization header must use Bearer scheme")
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            unauthorized_response("missing authorization header")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new("UNAUTHORIZED", message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Build a minimal router with the auth middleware and a simple handler.
    fn test_app(token: Option<String>) -> Router {
        let auth_config = AuthConfig { token };
        Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(from_fn(auth_middleware))
            .layer(axum::Extension(auth_config))
    }

    async fn error_message(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let err: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(err["error"]["code"], "UNAUTHORIZED");
        err["error"]["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn valid_bearer_token_accepted() {
        let app = test_app(Some("my-secret".to_string()));
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer my-secret")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn missing_authorization_header_rejected() {
        let app = test_app(Some("my-secret".to_string()));
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("missing"));
    }

    #[tokio::test]
    async fn invalid_token_rejected() {
        let app = test_app(Some("my-secret".to_string()));
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer wrong-token")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("invalid"));
    }

    #[tokio::test]
    async fn non_bearer_scheme_rejected() {
        let app = test_app(Some("my-secret".to_string()));
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.contains("Bearer scheme"));
    }

    #[tokio::test]
    async fn auth_disabled_allows_all_requests() {
        let app = test_app(None);
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn token_comparison() {
        assert!(constant_time_token_eq("abc", "abc"));
        assert!(!constant_time_token_eq("abc", "abd"));
        assert!(!constant_time_token_eq("ab", "abc"));
        assert!(!constant_time_token_eq("", "abc"));
    }

    #[test]
    fn debug_redacts_token() {
        let config = AuthConfig {
            token: Some("super-secret".into()),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret"));
    }
}
