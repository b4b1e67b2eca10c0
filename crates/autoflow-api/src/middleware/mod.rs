//! # Middleware Stack
//!
//! Tower middleware for the API layer:
//! - [`tracing_layer`]: request/response tracing with `TraceLayer`.
//! - [`metrics`]: request and error counters.
//! - [`rate_limit`]: per-user fixed-window rate limiting.

pub mod metrics;
pub mod rate_limit;
pub mod tracing_layer;
