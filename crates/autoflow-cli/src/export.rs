//! # Export CLI
//!
//! `autoflow export <DIR>` packs the workspace into a gzip-compressed tar
//! archive with every file under a directory named after the project. The
//! archive is byte-for-byte reproducible for the same input.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autoflow_core::archive::archive_file_name;
use autoflow_core::export_archive;
use clap::Args;

use crate::read_workspace;

/// Arguments for `autoflow export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Workspace directory.
    pub dir: PathBuf,

    /// Project name. Defaults to the directory name.
    #[arg(long)]
    pub name: Option<String>,

    /// Archive path. Defaults to `<project-slug>.tar.gz` in the current directory.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

fn project_name(args: &ExportArgs) -> Result<String> {
    if let Some(name) = &args.name {
        return Ok(name.clone());
    }
    let dir = args
        .dir
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", args.dir.display()))?;
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a project name from {}", dir.display()))
}

/// Build the archive for `dir` and write it to `out`.
pub fn export_directory(dir: &Path, name: &str, out: &Path) -> Result<usize> {
    let files = read_workspace(dir)?;
    anyhow::ensure!(!files.is_empty(), "workspace {} has no files to export", dir.display());
    let bytes = export_archive(name, &files)
        .with_context(|| format!("failed to build archive for {name}"))?;
    std::fs::write(out, &bytes).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(files = files.len(), bytes = bytes.len(), out = %out.display(), "archive written");
    Ok(files.len())
}

/// Execute `autoflow export`.
pub fn run_export(args: &ExportArgs) -> Result<u8> {
    let name = project_name(args)?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(archive_file_name(&name)));

    let count = export_directory(&args.dir, &name, &out)?;
    println!("Exported {count} file(s) to {}", out.display());
    Ok(0)
}
