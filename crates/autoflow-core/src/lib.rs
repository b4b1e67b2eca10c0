#![deny(missing_docs)]

//! # autoflow-core: Foundational Types for AutoFlow Learn
//!
//! Every other crate in the workspace builds on the types defined here.
//! There are no internal crate dependencies: only `serde`, `serde_json`, `thiserror`,
//! `serde_yaml`, `chrono`, `sha2`, `tracing`, and the archive crates (`tar`, `flate2`).
//!
//! ## Design Principles
//!
//! 1. **Validated newtypes at the edges.** [`TutorialId`] and [`Username`]
//!    check their format at construction, so a malformed identifier cannot
//!    reach the progress book or the stores.
//!
//! 2. **[`FileSet`] is the unit of work.** The preview composer, the GitHub
//!    publisher, and the archive exporter all consume the same ordered file
//!    set, validated once by [`FileSet::validate`].
//!
//! 3. **Progress only moves forward.** [`ProgressBook::mark_step_complete`]
//!    never lowers `current_step`, and completion timestamps are sticky.
//!
//! 4. **Structured errors.** Every fallible operation returns one of the
//!    `thiserror` enums in [`error`]. No `.unwrap()` outside tests.

pub mod achievement;
pub mod archive;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod progress;
pub mod project;
pub mod tutorial;
pub mod workspace;

pub use achievement::{evaluate_achievements, AchievementId, AchievementStatus};
pub use archive::export_archive;
pub use catalog::{Catalog, CategoryCount};
pub use error::{ArchiveError, CatalogError, ProgressError, ValidationError};
pub use identity::{TutorialId, Username};
pub use progress::{OverallProgress, ProgressBook, TutorialProgress};
pub use project::infer_technologies;
pub use tutorial::{Difficulty, Lesson, Tutorial};
pub use workspace::{FileSet, Language, SourceFile};
