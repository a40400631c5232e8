//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod page_id;
pub(crate) mod publish;

use std::path::PathBuf;

use clap::Args;
use confpub_config::{CliSettings, Config, ConfluenceConfig};
use confpub_confluence::{Auth, ConfluenceClient};

use crate::error::CliError;

pub(crate) use convert::ConvertArgs;
pub(crate) use page_id::PageIdArgs;
pub(crate) use publish::PublishArgs;

/// Server connection flags shared by commands that talk to Confluence.
///
/// Each flag falls back to its environment variable, then to
/// `confpub.toml`.
#[derive(Args, Debug, Default)]
pub(crate) struct ConnectionArgs {
    /// Confluence base URL, e.g. `https://confluence.example.com`.
    #[arg(long, env = "CONFPUB_BASE_URL")]
    base_url: Option<String>,

    /// Personal access token (bearer authentication).
    #[arg(long, env = "CONFPUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Username for basic authentication.
    #[arg(long, env = "CONFPUB_USERNAME")]
    username: Option<String>,

    /// Password for basic authentication.
    #[arg(long, env = "CONFPUB_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Space key.
    #[arg(long = "space", env = "CONFPUB_SPACE")]
    space_key: Option<String>,

    /// Path to configuration file (default: auto-discover confpub.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Connection overrides for [`Config::load`].
    pub(crate) fn cli_settings(&self) -> CliSettings {
        CliSettings {
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            space_key: self.space_key.clone(),
            ..Default::default()
        }
    }

    /// Load the configuration with `settings` applied on top.
    pub(crate) fn load_config(&self, settings: &CliSettings) -> Result<Config, CliError> {
        let config = Config::load(self.config.as_deref(), Some(settings))?;
        match &config.config_path {
            Some(path) => tracing::debug!("Using config {}", path.display()),
            None => tracing::debug!("No confpub.toml found, using defaults"),
        }
        Ok(config)
    }
}

/// Build a client from validated connection settings.
pub(crate) fn connect(confluence: &ConfluenceConfig) -> Result<ConfluenceClient, CliError> {
    let auth = Auth::from(confluence.credentials()?);
    Ok(ConfluenceClient::new(&confluence.base_url, &auth))
}
