//! Configuration management.
//!
//! Configuration is an explicit value: load it once and pass the relevant
//! sections to [`RequestClient`](crate::client::RequestClient) and the
//! controllers. Nothing in the library reads global endpoint settings.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! summarize_url = "http://localhost:8001"
//! timeout_secs = 10
//! connect_timeout_secs = 5
//!
//! [articles]
//! page = 1
//! limit = 10
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! Every key can be overridden from the environment with the
//! `ARCHIVE_ASSISTANT__` prefix and `__` between sections, e.g.
//! `ARCHIVE_ASSISTANT__API__BASE_URL`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "archive-assistant.toml";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "ARCHIVE_ASSISTANT";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend endpoints and timeouts
    #[serde(default)]
    pub api: ApiConfig,

    /// Document list paging
    #[serde(default)]
    pub articles: ArticlesConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Archive endpoint serving `/articles`, `/search` and `/query`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Separate summarization endpoint; defaults to `base_url`
    #[serde(default)]
    pub summarize_url: Option<String>,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Custom user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            summarize_url: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: None,
        }
    }
}

impl ApiConfig {
    /// The endpoint `/summarize` is sent to
    pub fn summarize_base_url(&self) -> &str {
        self.summarize_url.as_deref().unwrap_or(&self.base_url)
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Document list configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlesConfig {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ArticlesConfig {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"json"` for structured output, anything else for plain text
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Render as TOML, e.g. to seed a config file
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Load configuration from a file, with environment overrides on top
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(env_source())
        .build()?;

    settings.try_deserialize()
}

/// Defaults with environment overrides applied
pub fn load_from_env() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Look for a config file in the working directory, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("archive-assistant").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Get the default configuration
pub fn get_config() -> Config {
    Config::default()
}
