use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::slack::message::ResponseType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub bitrise: BitriseConfig,
    /// One entry per slash command
    #[serde(default)]
    pub wizards: Vec<WizardConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a file in `dir` instead of stderr
    #[serde(default)]
    pub to_file: bool,

    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            dir: default_log_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlackConfig {
    /// Legacy verification token; requests carrying another token are
    /// rejected when set
    #[serde(default)]
    pub verification_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_github_api")]
    pub api_base: String,
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_github_api(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitriseConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_bitrise_api")]
    pub api_base: String,
}

fn default_bitrise_api() -> String {
    "https://api.bitrise.io/v0.1".to_string()
}

impl Default for BitriseConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_bitrise_api(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Slash command, including the leading `/`
    pub command: String,
    pub title: String,
    /// Prefix of every action id this wizard renders
    pub action_prefix: String,
    #[serde(default)]
    pub response_type: ResponseType,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Where branches and the deployed version come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub owner: String,
    pub repo: String,
    /// JSON file holding the version and build number
    #[serde(default = "default_version_file")]
    pub version_file: String,
    #[serde(default = "default_version_key")]
    pub version_key: String,
    #[serde(default = "default_build_version_key")]
    pub build_version_key: String,
}

fn default_version_file() -> String {
    "version.json".to_string()
}

fn default_version_key() -> String {
    "version".to_string()
}

fn default_build_version_key() -> String {
    "buildVersion".to_string()
}

/// A Bitrise workflow a wizard can trigger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub id: String,
    pub name: String,
    pub app_slug: String,
    pub workflow_id: String,
    #[serde(default = "default_version_env")]
    pub version_env: String,
    #[serde(default = "default_build_version_env")]
    pub build_version_env: String,
}

fn default_version_env() -> String {
    "VERSION".to_string()
}

fn default_build_version_env() -> String {
    "BUILD_VERSION".to_string()
}

/// Reasons a loaded configuration cannot serve requests
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no wizards configured")]
    NoWizards,
    #[error("command '{0}' must start with '/'")]
    InvalidCommand(String),
    #[error("command '{0}' is configured more than once")]
    DuplicateCommand(String),
    #[error("action prefix '{0}' may only contain letters, digits and '-'")]
    InvalidPrefix(String),
    #[error("action prefix '{0}' is configured more than once")]
    DuplicatePrefix(String),
    #[error("wizard '{0}' has no destinations")]
    NoDestinations(String),
    #[error("destination id '{id}' is used twice in wizard '{command}'")]
    DuplicateDestination { command: String, id: String },
}

impl Config {
    /// Config file looked up in the working directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("deliver.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so partial config files work
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/deliver/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("deliver").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with DELIVER_ prefix, e.g. DELIVER_GITHUB__TOKEN
        builder = builder.add_source(
            config::Environment::with_prefix("DELIVER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Check the wizard definitions for conflicts that would break routing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wizards.is_empty() {
            return Err(ConfigError::NoWizards);
        }

        let mut commands = HashSet::new();
        let mut prefixes = HashSet::new();
        for wizard in &self.wizards {
            if !wizard.command.starts_with('/') {
                return Err(ConfigError::InvalidCommand(wizard.command.clone()));
            }
            if !commands.insert(wizard.command.as_str()) {
                return Err(ConfigError::DuplicateCommand(wizard.command.clone()));
            }

            let prefix = &wizard.action_prefix;
            let valid = !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !valid {
                return Err(ConfigError::InvalidPrefix(prefix.clone()));
            }
            if !prefixes.insert(prefix.as_str()) {
                return Err(ConfigError::DuplicatePrefix(prefix.clone()));
            }

            if wizard.destinations.is_empty() {
                return Err(ConfigError::NoDestinations(wizard.command.clone()));
            }
            let mut ids = HashSet::new();
            for destination in &wizard.destinations {
                if !ids.insert(destination.id.as_str()) {
                    return Err(ConfigError::DuplicateDestination {
                        command: wizard.command.clone(),
                        id: destination.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Get absolute path to the log directory
    pub fn logs_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.logging.dir);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            slack: SlackConfig::default(),
            github: GitHubConfig::default(),
            bitrise: BitriseConfig::default(),
            wizards: Vec::new(),
        }
    }
}
