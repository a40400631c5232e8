//! `confpub page-id` command implementation.

use std::io::{self, Write};

use clap::Args;
use confpub_config::Config;
use confpub_confluence::locator::{PageLocation, parse_page_url, resolve_page_id};

use super::{ConnectionArgs, connect};
use crate::error::CliError;

/// Arguments for the page-id command.
#[derive(Args, Debug)]
pub(crate) struct PageIdArgs {
    /// Page URL (`.../viewpage.action?pageId=N` or `.../display/SPACE/Title`).
    url: String,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl PageIdArgs {
    /// Execute the page-id command.
    ///
    /// URLs that carry the ID are answered without configuration; title URLs
    /// need a connection to look the page up.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not recognized or the lookup fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let id = match parse_page_url(&self.url)? {
            PageLocation::Id(id) => id,
            PageLocation::Title { .. } => {
                let config: Config = self
                    .connection
                    .load_config(&self.connection.cli_settings())?;
                let client = connect(config.require_confluence()?)?;
                resolve_page_id(&client, &self.url)?
            }
        };

        writeln!(io::stdout(), "{id}")?;
        Ok(())
    }
}
