use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::cli::Cli;
use crate::domain::StatusPattern;

const DEFAULT_CONFIG_NAME: &str = "swagtomock";
const ENV_PREFIX: &str = "SWAGTOMOCK";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    /// Prefix stripped from each document's declared base URL
    #[serde(default)]
    pub url: String,
    /// Local mount prefix substituted for `url`
    #[serde(default)]
    pub local_url: String,
    /// Folder holding the description documents
    #[serde(default = "default_folder")]
    pub folder: String,
    /// How many times one reference path may be revisited on a branch
    #[serde(default = "default_max_loops")]
    pub max_loops: usize,
    /// Preferred response media type
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub status: StatusSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Status-code patterns, e.g. `2XX` or `404`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusSettings {
    /// Pattern used to pick the declared response
    #[serde(default = "default_status")]
    pub default: String,
    /// Pattern answered for requests that match no mock route
    #[serde(default = "error_status")]
    pub error: String,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            default: default_status(),
            error: error_status(),
        }
    }
}

fn default_folder() -> String {
    "./yamls".to_string()
}

fn default_max_loops() -> usize {
    2
}

fn default_content_type() -> String {
    "*/*".to_string()
}

fn default_status() -> String {
    "2XX".to_string()
}

fn error_status() -> String {
    "4XX".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            url: String::new(),
            local_url: String::new(),
            folder: default_folder(),
            max_loops: default_max_loops(),
            content_type: default_content_type(),
            status: StatusSettings::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    /// Loads `swagtomock.{toml,yaml,json}` from `root`, then the environment.
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join(DEFAULT_CONFIG_NAME);
        let settings = Self::load(File::from(config_path).required(false))?;
        settings.validate()?;
        Ok(settings)
    }

    fn load<S>(file: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Settings::default();
        let s = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("url", defaults.url)?
            .set_default("local_url", defaults.local_url)?
            .set_default("folder", defaults.folder)?
            .set_default("max_loops", defaults.max_loops as i64)?
            .set_default("content_type", defaults.content_type)?
            .set_default("status.default", defaults.status.default)?
            .set_default("status.error", defaults.status.error)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(folder) = &cli.folder {
            self.folder = folder.clone();
        }
        if let Some(url) = &cli.url {
            self.url = url.clone();
        }
        if let Some(local_url) = &cli.local_url {
            self.local_url = local_url.clone();
        }
        if let Some(max_loops) = cli.max_loops {
            self.max_loops = max_loops;
        }
        if let Some(content_type) = &cli.content_type {
            self.content_type = content_type.clone();
        }
    }

    /// Runs [`validator::ConfigValidator`], joining every error into one.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Parsed `status.default` and `status.error` patterns.
    pub fn status_patterns(&self) -> Result<(StatusPattern, StatusPattern), anyhow::Error> {
        Ok((self.status.default.parse()?, self.status.error.parse()?))
    }
}
