//! # autoflow-cli: Command-Line Tool for AutoFlow Learn
//!
//! Works on a workspace directory on disk: a flat folder of source files,
//! the same shape the learner edits in the browser.
//!
//! ## Subcommands
//!
//! - `autoflow preview`: Compose a directory into one self-contained HTML document.
//! - `autoflow export`: Pack a directory into a `.tar.gz` archive.
//! - `autoflow init`: Scaffold the starter workspace.
//! - `autoflow catalog`: Validate a tutorial catalog and list its tutorials.
//!
//! ```bash
//! autoflow init my-site
//! autoflow preview my-site --out preview.html
//! autoflow export my-site --name "My Site"
//! autoflow catalog --path tutorials.yaml
//! ```

pub mod catalog;
pub mod export;
pub mod init;
pub mod preview;

use std::path::Path;

use anyhow::{Context, Result};
use autoflow_core::{FileSet, SourceFile};

/// Read the regular files directly inside `dir` into a file set, sorted by
/// name. Hidden files and subdirectories are skipped.
pub fn read_workspace(dir: &Path) -> Result<FileSet> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read workspace directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if !entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .is_file()
        {
            tracing::debug!(path = %path.display(), "skipping non-file entry");
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {} as UTF-8 text", path.display()))?;
        files.push(SourceFile::new(name, content));
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let set = FileSet::from(files);
    set.validate()
        .with_context(|| format!("workspace {} is not a valid file set", dir.display()))?;
    tracing::debug!(dir = %dir.display(), files = set.len(), "workspace loaded");
    Ok(set)
}
