//! # Catalog CLI
//!
//! `autoflow catalog` loads a tutorial catalog (YAML or JSON, or the
//! built-in one), runs the same validation the server runs at startup, and
//! lists the tutorials it contains.

use std::path::PathBuf;

use anyhow::{Context, Result};
use autoflow_core::Catalog;
use clap::Args;

/// Arguments for `autoflow catalog`.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog file (`.yaml`, `.yml` or `.json`). Defaults to the built-in catalog.
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Only validate; print nothing on success.
    #[arg(long)]
    pub quiet: bool,
}

/// Load the catalog named by `args`.
pub fn load_catalog(args: &CatalogArgs) -> Result<Catalog> {
    match &args.path {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("catalog {} is invalid", path.display())),
        None => Catalog::builtin().context("built-in catalog is invalid"),
    }
}

/// One line per tutorial: id, category, difficulty, lessons, minutes.
pub fn summary_lines(catalog: &Catalog) -> Vec<String> {
    catalog
        .tutorials()
        .iter()
        .map(|t| {
            format!(
                "{:<24} {:<16} {:<12} {:>2} lessons {:>4} min",
                t.id.as_str(),
                t.category,
                t.difficulty.as_str(),
                t.lesson_count(),
                t.duration
            )
        })
        .collect()
}

/// Execute `autoflow catalog`.
pub fn run_catalog(args: &CatalogArgs) -> Result<u8> {
    let catalog = load_catalog(args)?;
    if args.quiet {
        return Ok(0);
    }
    for line in summary_lines(&catalog) {
        println!("{line}");
    }
    let categories: Vec<String> = catalog
        .categories()
        .into_iter()
        .map(|c| format!("{} ({})", c.category, c.count))
        .collect();
    println!();
    println!("{} tutorial(s): {}", catalog.len(), categories.join(", "));
    Ok(0)
}
