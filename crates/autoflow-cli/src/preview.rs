//! # Preview CLI
//!
//! `autoflow preview <DIR>` composes the workspace in `DIR` into a single
//! HTML document with its stylesheets and scripts inlined and the content
//! policy injected. With `--frame`, the document is wrapped in a host page
//! that renders it inside a sandboxed iframe.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autoflow_preview::{PreviewComposer, PreviewMode, SandboxPolicy};
use clap::Args;

use crate::read_workspace;

/// Arguments for `autoflow preview`.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Workspace directory.
    pub dir: PathBuf,

    /// Write the document here instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Emit a host page with the preview in a sandboxed iframe.
    #[arg(long)]
    pub frame: bool,
}

/// Compose the workspace in `dir`. Returns the HTML and whether an entry
/// document was found.
pub fn render_directory(dir: &Path, frame: bool) -> Result<(String, PreviewMode)> {
    let files = read_workspace(dir)?;
    let document = PreviewComposer::new().compose(files.as_slice());
    tracing::info!(
        mode = ?document.mode,
        entry = document.entry.as_deref().unwrap_or("-"),
        styles = document.inlined_styles,
        scripts = document.inlined_scripts,
        "preview composed"
    );

    let html = if frame {
        SandboxPolicy::scripts_only().host_page(&document.html, "Live Preview")
    } else {
        document.html
    };
    Ok((html, document.mode))
}

/// Execute `autoflow preview`.
pub fn run_preview(args: &PreviewArgs) -> Result<u8> {
    let (html, mode) = render_directory(&args.dir, args.frame)?;
    if mode == PreviewMode::Fallback {
        tracing::warn!(dir = %args.dir.display(), "no HTML file found, rendered the file listing");
    }

    match &args.out {
        Some(path) => {
            std::fs::write(path, &html)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote preview to {}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(0)
}
