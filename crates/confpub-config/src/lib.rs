//! Configuration management for confpub.
//!
//! Parses `confpub.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values in the `[confluence]` section support environment variable
//! expansion, so credentials never have to be written into the file:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `confluence.base_url`
//! - `confluence.token`
//! - `confluence.username`
//! - `confluence.password`
//! - `confluence.space_key`

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "confpub.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence base URL.
    pub base_url: Option<String>,
    /// Override personal access token (clears username/password).
    pub token: Option<String>,
    /// Override basic-auth username (clears token).
    pub username: Option<String>,
    /// Override basic-auth password.
    pub password: Option<String>,
    /// Override space key.
    pub space_key: Option<String>,
    /// Override body rendering mode.
    pub mode: Option<BodyMode>,
    /// Override attachment upload flag.
    pub attach: Option<bool>,
    /// Override attachment comment.
    pub comment: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings.
    pub confluence: Option<ConfluenceConfig>,
    /// Publishing behaviour.
    pub publish: PublishConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Confluence server base URL (no `/rest` suffix).
    pub base_url: String,
    /// Personal access token (bearer auth).
    pub token: Option<String>,
    /// Username for basic auth.
    pub username: Option<String>,
    /// Password for basic auth.
    pub password: Option<String>,
    /// Default space key.
    pub space_key: Option<String>,
}

/// Credentials resolved from [`ConfluenceConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Personal access token presented as `Authorization: Bearer`.
    Token(String),
    /// Username and password presented as `Authorization: Basic`.
    Basic {
        /// Login name.
        username: String,
        /// Password.
        password: String,
    },
}

impl ConfluenceConfig {
    /// Validate that the connection fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the URL is empty or malformed, or
    /// if no usable credential is configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "confluence.base_url")?;
        require_http_url(&self.base_url, "confluence.base_url")?;
        self.credentials()?;
        Ok(())
    }

    /// Resolve the configured credential.
    ///
    /// A non-empty token wins; otherwise both username and password must be set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when neither form is complete.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Credentials::Token(token.to_owned()));
        }
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Ok(Credentials::Basic {
                    username: user.to_owned(),
                    password: pass.to_owned(),
                })
            }
            (Some(user), _) if !user.is_empty() => Err(ConfigError::Validation(
                "confluence.password cannot be empty when confluence.username is set".to_owned(),
            )),
            _ => Err(ConfigError::Validation(
                "confluence.token or confluence.username/confluence.password required".to_owned(),
            )),
        }
    }

    /// Get the space key, failing if it is not configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the space key is missing or empty.
    pub fn require_space_key(&self) -> Result<&str, ConfigError> {
        match self.space_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ConfigError::Validation(
                "confluence.space_key required (via --space or config)".to_owned(),
            )),
        }
    }
}

/// How a text file is rendered into the page body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    /// Verbatim inside a code macro.
    #[default]
    Code,
    /// Entity-escaped paragraph with `<br />` line breaks.
    Escaped,
    /// Line-by-line rule table (headings, bold, italic, strikethrough).
    Markup,
}

impl BodyMode {
    /// All modes, in display order.
    pub const ALL: [Self; 3] = [Self::Code, Self::Escaped, Self::Markup];

    /// Lowercase name used in config files and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Escaped => "escaped",
            Self::Markup => "markup",
        }
    }
}

impl fmt::Display for BodyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expected = "expected code, escaped or markup";
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown body mode '{s}' ({expected})"))
    }
}

/// Publishing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Body rendering mode.
    pub mode: BodyMode,
    /// Wrap the body with heading, preview label and download link.
    pub annotate: bool,
    /// Upload the source file as an attachment.
    pub attach: bool,
    /// Comment stored with the uploaded attachment.
    pub comment: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: BodyMode::Code,
            annotate: true,
            attach: true,
            comment: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.token`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `confpub.toml` in current directory and parents,
    /// falling back to an empty configuration.
    ///
    /// CLI settings are applied after loading, so command-line values take
    /// precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let has_connection = settings.base_url.is_some()
            || settings.token.is_some()
            || settings.username.is_some()
            || settings.password.is_some()
            || settings.space_key.is_some();
        if has_connection {
            let confluence = self.confluence.get_or_insert_with(ConfluenceConfig::default);
            if let Some(base_url) = &settings.base_url {
                confluence.base_url.clone_from(base_url);
            }
            if let Some(token) = &settings.token {
                confluence.token = Some(token.clone());
                confluence.username = None;
                confluence.password = None;
            }
            if let Some(username) = &settings.username {
                confluence.username = Some(username.clone());
                confluence.token = None;
            }
            if let Some(password) = &settings.password {
                confluence.password = Some(password.clone());
            }
            if let Some(space_key) = &settings.space_key {
                confluence.space_key = Some(space_key.clone());
            }
        }

        if let Some(mode) = settings.mode {
            self.publish.mode = mode;
        }
        if let Some(attach) = settings.attach {
            self.publish.attach = attach;
        }
        if let Some(comment) = &settings.comment {
            self.publish.comment = Some(comment.clone());
        }
    }

    /// Get validated Confluence configuration.
    ///
    /// Use this instead of accessing the `confluence` field directly when the
    /// command needs to talk to the server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_confluence(&self) -> Result<&ConfluenceConfig, ConfigError> {
        let conf = self.confluence.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "Confluence connection required (--base-url or [confluence] section)".into(),
            )
        })?;
        conf.validate()?;
        Ok(conf)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut confluence) = self.confluence {
            confluence.base_url = expand::expand_env(&confluence.base_url, "confluence.base_url")?;
            expand::expand_opt(&mut confluence.token, "confluence.token")?;
            expand::expand_opt(&mut confluence.username, "confluence.username")?;
            expand::expand_opt(&mut confluence.password, "confluence.password")?;
            expand::expand_opt(&mut confluence.space_key, "confluence.space_key")?;
        }
        Ok(())
    }
}
