//! # autoflow-preview: Live Preview Composer
//!
//! Synthesizes the document shown in the workspace preview pane from the
//! learner's in-memory files. The result is a single HTML string that
//! carries its own content-security policy and is meant to be rendered in
//! a sandboxed frame ([`SandboxPolicy::scripts_only`]).
//!
//! ```
//! use autoflow_core::FileSet;
//! use autoflow_preview::{compose, PreviewMode};
//!
//! let doc = compose(FileSet::starter().as_slice());
//! assert_eq!(doc.mode, PreviewMode::Composed);
//! assert!(!doc.html.contains("<link"));
//! ```
//!
//! Composition is pure and synchronous. It has no error path: a workspace
//! without an HTML file renders as an escaped, read-only file listing.

pub mod compose;
pub mod csp;
pub mod escape;
pub mod fallback;
pub mod sandbox;

pub use compose::{compose, PreviewComposer, PreviewDocument, PreviewMode};
pub use csp::{ContentSecurityPolicy, DEFAULT_POLICY};
pub use sandbox::{SandboxPolicy, SandboxToken};
