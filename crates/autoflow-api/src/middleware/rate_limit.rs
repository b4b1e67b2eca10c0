//! # Per-User Rate Limiting
//!
//! Fixed-window counter keyed by the `X-User-Id` header. Requests without
//! the header share the `anonymous` bucket. Buckets whose window has
//! expired are swept at most once per window, so the map only holds keys
//! seen recently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;

use crate::error::ErrorBody;

/// Header that selects the rate limit bucket.
pub const RATE_LIMIT_KEY_HEADER: &str = "x-user-id";

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 600,
            window_secs: 60,
        }
    }
}

/// Per-key rate limit state.
#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

#[derive(Debug)]
struct LimiterState {
    buckets: HashMap<String, BucketState>,
    last_sweep: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    state: Arc<Mutex<LimiterState>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(LimiterState {
                buckets: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Check if a request from the given key should be allowed, counting it
    /// if so.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let window = Duration::from_secs(self.config.window_secs);
        let mut state = self.state.lock();

        if now.saturating_duration_since(state.last_sweep) >= window {
            let before = state.buckets.len();
            state
                .buckets
                .retain(|_, b| now.saturating_duration_since(b.window_start) < window);
            state.last_sweep = now;
            tracing::debug!(
                swept = before - state.buckets.len(),
                tracked = state.buckets.len(),
                "expired rate limit buckets swept"
            );
        }

        let bucket = state.buckets.entry(key.to_string()).or_insert(BucketState {
            count: 0,
            window_start: now,
        });

        if now.saturating_duration_since(bucket.window_start) >= window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            false
        } else {
            bucket.count += 1;
            true
        }
    }
}

/// Middleware that enforces per-user rate limits.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        let key = request
            .headers()
            .get(RATE_LIMIT_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("anonymous")
            .to_string();

        if !limiter.check(&key) {
            tracing::warn!(key = %key, "rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorBody::new("RATE_LIMITED", "rate limit exceeded")),
            )
                .into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window_secs: 60,
        })
    }

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = limiter(2);
        assert!(limiter.check("alice"));
        assert!(limiter.check("alice"));
        assert!(!limiter.check("alice"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(1);
        assert!(limiter.check("alice"));
        assert!(limiter.check("bob"));
        assert!(!limiter.check("alice"));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = limiter(1);
        let start = Instant::now();
        assert!(limiter.check_at("alice", start));
        assert!(!limiter.check_at("alice", start + Duration::from_secs(59)));
        assert!(limiter.check_at("alice", start + Duration::from_secs(60)));
    }

    #[test]
    fn expired_buckets_are_swept() {
        let limiter = limiter(1);
        let start = Instant::now();
        for i in 0..100 {
            assert!(limiter.check_at(&format!("user-{i}"), start));
        }
        assert_eq!(limiter.state.lock().buckets.len(), 100);

        assert!(limiter.check_at("late", start + Duration::from_secs(61)));
        let state = limiter.state.lock();
        assert_eq!(state.buckets.len(), 1);
        assert!(state.buckets.contains_key("late"));
    }

    #[test]
    fn live_buckets_survive_a_sweep() {
        let limiter = limiter(1);
        let start = Instant::now();
        assert!(limiter.check_at("old", start));
        assert!(limiter.check_at("recent", start + Duration::from_secs(30)));
        assert!(!limiter.check_at("recent", start + Duration::from_secs(61)));
        assert_eq!(limiter.state.lock().buckets.len(), 1);
    }

    #[test]
    fn default_is_600_per_minute() {
        let config = RateLimitConfig::default();
        assert_eq!((config.max_requests, config.window_secs), (600, 60));
    }
}
