//! # autoflow CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use autoflow_cli::catalog::{run_catalog, CatalogArgs};
use autoflow_cli::export::{run_export, ExportArgs};
use autoflow_cli::init::{run_init, InitArgs};
use autoflow_cli::preview::{run_preview, PreviewArgs};

/// AutoFlow Learn CLI
///
/// Compose live previews, export and scaffold workspaces, and check
/// tutorial catalogs from the command line.
#[derive(Parser, Debug)]
#[command(name = "autoflow", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose a workspace directory into one self-contained HTML document.
    Preview(PreviewArgs),

    /// Pack a workspace directory into a reproducible .tar.gz archive.
    Export(ExportArgs),

    /// Scaffold the starter workspace.
    Init(InitArgs),

    /// Validate a tutorial catalog and list its tutorials.
    Catalog(CatalogArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so `autoflow preview` output can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Preview(args) => run_preview(&args),
        Commands::Export(args) => run_export(&args),
        Commands::Init(args) => run_init(&args),
        Commands::Catalog(args) => run_catalog(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_preview() {
        let cli = Cli::try_parse_from(["autoflow", "preview", "site", "--out", "p.html"]).unwrap();
        if let Commands::Preview(args) = cli.command {
            assert_eq!(args.dir, PathBuf::from("site"));
            assert_eq!(args.out, Some(PathBuf::from("p.html")));
            assert!(!args.frame);
        } else {
            panic!("expected preview");
        }
    }

    #[test]
    fn cli_parse_export_with_name() {
        let cli = Cli::try_parse_from(["autoflow", "export", "site", "--name", "My Site"]).unwrap();
        if let Commands::Export(args) = cli.command {
            assert_eq!(args.name.as_deref(), Some("My Site"));
            assert!(args.out.is_none());
        } else {
            panic!("expected export");
        }
    }

    #[test]
    fn cli_parse_init_defaults_to_cwd() {
        let cli = Cli::try_parse_from(["autoflow", "init"]).unwrap();
        if let Commands::Init(args) = cli.command {
            assert_eq!(args.dir, PathBuf::from("."));
            assert!(!args.force);
        } else {
            panic!("expected init");
        }
    }

    #[test]
    fn cli_parse_catalog() {
        let cli = Cli::try_parse_from(["autoflow", "catalog", "--path", "t.yaml", "--quiet"]).unwrap();
        assert!(matches!(cli.command, Commands::Catalog(_)));
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["autoflow", "-vv", "catalog"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["autoflow"]).is_err());
    }
}
