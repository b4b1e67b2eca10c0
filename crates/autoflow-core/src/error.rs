//! # Error Hierarchy
//!
//! Structured error types for AutoFlow Learn, built with `thiserror`.
//!
//! Each subsystem owns an enum whose variants carry the offending input,
//! so operators and API clients can see what was rejected and why.

use thiserror::Error;

/// Validation errors for identifiers and workspace file sets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A file name was empty.
    #[error("file name must not be empty")]
    EmptyFileName,

    /// A file name contains a path separator, NUL, or is a dot entry.
    #[error("invalid file name \"{name}\": {reason}")]
    InvalidFileName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Two files in one set share a name.
    #[error("duplicate file name \"{0}\"")]
    DuplicateFileName(String),

    /// The file set has more entries than allowed.
    #[error("too many files: {count} (maximum {max})")]
    TooManyFiles {
        /// Number of files submitted.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The combined content of the file set exceeds the size limit.
    #[error("file set too large: {bytes} bytes (maximum {max})")]
    FileSetTooLarge {
        /// Total content size in bytes.
        bytes: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Tutorial identifier is not a lowercase slug.
    #[error("invalid tutorial id \"{0}\" (expected 1-64 chars of [a-z0-9-])")]
    InvalidTutorialId(String),

    /// Username does not match the allowed format.
    #[error("invalid username \"{0}\" (expected 3-39 chars of [A-Za-z0-9_-])")]
    InvalidUsername(String),

    /// A required text field was empty after trimming.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A text field exceeded its length limit.
    #[error("{field} must not exceed {max} characters")]
    FieldTooLong {
        /// Field name.
        field: &'static str,
        /// Maximum length in characters.
        max: usize,
    },
}

/// Errors while loading or validating the tutorial catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog {path}: {source}")]
    Io {
        /// Path of the catalog file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// YAML parse failure.
    #[error("invalid YAML catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse failure.
    #[error("invalid JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is neither YAML nor JSON.
    #[error("unsupported catalog format \"{0}\" (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// Two tutorials share an id.
    #[error("duplicate tutorial id \"{0}\"")]
    DuplicateId(String),

    /// A tutorial has an empty title.
    #[error("tutorial \"{0}\" has an empty title")]
    EmptyTitle(String),

    /// A tutorial has no lessons.
    #[error("tutorial \"{0}\" has no lessons")]
    NoLessons(String),
}

/// Errors while recording tutorial progress.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    /// The tutorial is not in the catalog.
    #[error("unknown tutorial \"{0}\"")]
    UnknownTutorial(String),

    /// The step index is past the last lesson.
    #[error("step {step} is out of range for tutorial \"{tutorial}\" ({lesson_count} lessons)")]
    StepOutOfRange {
        /// Tutorial identifier.
        tutorial: String,
        /// Requested step index (zero-based).
        step: u32,
        /// Number of lessons in the tutorial.
        lesson_count: usize,
    },
}

/// Errors while building an export archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The file set failed validation.
    #[error("invalid file set: {0}")]
    Validation(#[from] ValidationError),

    /// Writing the archive failed.
    #[error("archive write failed: {0}")]
    Io(#[from] std::io::Error),
}
