//! `confpub convert` command implementation.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use confpub_config::{BodyMode, Config};
use confpub_confluence::ContentFormatter;
use confpub_confluence::publisher::read_source;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args, Debug)]
pub(crate) struct ConvertArgs {
    /// Text file to convert.
    file: PathBuf,

    /// Body rendering mode (default: from config, or code).
    #[arg(long)]
    mode: Option<BodyMode>,

    /// Emit only the body block, without heading, preview label and download link.
    #[arg(long)]
    bare: bool,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover confpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the output written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let body = self.render(&config)?;

        match &self.output {
            Some(path) => {
                fs::write(path, &body)?;
                Output::new().success(&format!("Wrote {}", path.display()));
            }
            None => writeln!(io::stdout(), "{body}")?,
        }
        Ok(())
    }

    fn render(&self, config: &Config) -> Result<String, CliError> {
        let source = read_source(&self.file)?;
        let formatter = ContentFormatter::new(self.mode.unwrap_or(config.publish.mode))
            .annotate(config.publish.annotate && !self.bare);
        Ok(formatter.format(&source.text, &source.filename))
    }
}
