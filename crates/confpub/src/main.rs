//! confpub CLI - publish text files to Confluence.
//!
//! Provides commands for:
//! - `publish`: Create or update a page from a text file and attach the file
//! - `page-id`: Resolve the page ID behind a page URL
//! - `convert`: Render a text file to storage format locally

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConvertArgs, PageIdArgs, PublishArgs};
use output::Output;

/// confpub - publish text files to Confluence.
#[derive(Parser)]
#[command(name = "confpub", version, about)]
struct Cli {
    /// Enable verbose output (info-level logging).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update a page from a text file.
    Publish(PublishArgs),
    /// Print the ID of the page behind a URL.
    PageId(PageIdArgs),
    /// Render a text file to storage format without contacting Confluence.
    Convert(ConvertArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Publish(args) => args.execute(),
        Commands::PageId(args) => args.execute(),
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_verbose_filter() {
        assert_eq!(log_filter(true).to_string(), "info");
    }

    #[test]
    fn test_default_filter_is_warn() {
        // SAFETY: no other test reads RUST_LOG
        unsafe {
            std::env::remove_var("RUST_LOG");
        }
        assert_eq!(log_filter(false).to_string(), "warn");
    }
}
