//! # Init CLI
//!
//! `autoflow init <DIR>` writes the starter workspace (`index.html`,
//! `style.css`, `app.js`). Existing files are left alone unless `--force`
//! is given.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use autoflow_core::FileSet;
use clap::Args;

/// Arguments for `autoflow init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to create. Defaults to the current directory.
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite starter files that already exist.
    #[arg(long)]
    pub force: bool,
}

/// Write the starter files into `dir`, creating it if needed. Returns the
/// paths written.
pub fn scaffold(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let starter = FileSet::starter();

    if !force {
        let existing: Vec<&str> = starter
            .iter()
            .filter(|f| dir.join(&f.name).exists())
            .map(|f| f.name.as_str())
            .collect();
        if !existing.is_empty() {
            bail!(
                "{} already contains {}; pass --force to overwrite",
                dir.display(),
                existing.join(", ")
            );
        }
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::with_capacity(starter.len());
    for file in &starter {
        let path = dir.join(&file.name);
        std::fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

/// Execute `autoflow init`.
pub fn run_init(args: &InitArgs) -> Result<u8> {
    let written = scaffold(&args.dir, args.force)?;
    for path in &written {
        println!("  created {}", path.display());
    }
    println!(
        "Starter workspace ready. Preview it with: autoflow preview {}",
        args.dir.display()
    );
    Ok(0)
}
