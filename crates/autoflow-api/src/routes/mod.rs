//! # API Route Modules
//!
//! - `tutorials`: catalog browsing and loading lesson code into a workspace.
//! - `users`: learner accounts, achievements, and a user's projects.
//! - `progress`: per-tutorial progress and the overall summary.
//! - `projects`: saved workspaces and their rendered preview.
//! - `preview`: stateless preview composition (JSON, raw, and framed).
//! - `workspace`: starter files, GitHub publishing, and archive export.
//! - `metrics`: request counters.

pub mod metrics;
pub mod preview;
pub mod progress;
pub mod projects;
pub mod tutorials;
pub mod users;
pub mod workspace;
