//! Configuration System
//!
//! Loads the inventory directory: application settings (`config.toml`),
//! the host inventory (`hosts.toml`) and the ignore-rule list (`ignore.toml`).
//! Environment variables override a handful of settings.
//!
//! Everything is read once at startup into an [`Inventory`] that is passed by
//! reference to the rest of the pipeline and never mutated afterwards.

use crate::filter::IgnoreRule;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "config.toml";
/// Host inventory file name inside the config directory
pub const HOSTS_FILE: &str = "hosts.toml";
/// Ignore-rule file name inside the config directory
pub const IGNORE_FILE: &str = "ignore.toml";

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Search backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,

    #[serde(default = "default_index_patterns")]
    pub index_patterns: Vec<String>,

    #[serde(default)]
    pub username: String,

    /// Environment variable holding the password
    #[serde(default = "default_password_env")]
    pub password_env: String,

    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Offset applied to absolute date windows
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_urls() -> Vec<String> {
    vec!["https://localhost:9200".to_string()]
}

fn default_index_patterns() -> Vec<String> {
    vec!["syslog-*".to_string()]
}

fn default_password_env() -> String {
    "LOGSIFT_PASSWORD".to_string()
}

fn default_accept_invalid_certs() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_time_zone() -> String {
    "+03:00".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            index_patterns: default_index_patterns(),
            username: String::new(),
            password_env: default_password_env(),
            accept_invalid_certs: default_accept_invalid_certs(),
            request_timeout_secs: default_request_timeout(),
            time_zone: default_time_zone(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_max_records")]
    pub max_records: u32,

    /// Used when the terminal size cannot be read
    #[serde(default = "default_terminal_width")]
    pub terminal_width: u16,

    #[serde(default)]
    pub descending: bool,
}

fn default_max_records() -> u32 {
    500
}

fn default_terminal_width() -> u16 {
    120
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            terminal_width: default_terminal_width(),
            descending: false,
        }
    }
}

/// Ignore-rule switch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// One host entry from `hosts.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostEntry {
    pub hostname: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IgnoreFile {
    #[serde(default)]
    rule: Vec<IgnoreRule>,
}

impl Config {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load settings with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LOGSIFT_URL") {
            self.search.urls = url
                .split(',')
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }
        if let Ok(user) = std::env::var("LOGSIFT_USER") {
            self.search.username = user;
        }

        if let Ok(level) = std::env::var("LOGSIFT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOGSIFT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// The full, immutable configuration set for one invocation
#[derive(Debug, Clone)]
pub struct Inventory {
    pub config: Config,
    /// Logical host name -> entry, ordered by name
    pub hosts: BTreeMap<String, HostEntry>,
    pub ignore_rules: Vec<IgnoreRule>,
}

impl Inventory {
    /// Load all three files from a config directory.
    ///
    /// The directory, `config.toml` and `hosts.toml` are required. A missing
    /// `ignore.toml` means no rules.
    pub fn load_dir(dir: &Path) -> Result<Self, ConfigError> {
        if !dir.is_dir() {
            return Err(ConfigError::MissingDir(dir.to_path_buf()));
        }

        let config = Config::load_with_env(&dir.join(SETTINGS_FILE))?;
        let hosts = load_hosts(&dir.join(HOSTS_FILE))?;

        let ignore_path = dir.join(IGNORE_FILE);
        let ignore_rules = if ignore_path.exists() {
            load_ignore_rules(&ignore_path)?
        } else {
            tracing::debug!("No ignore rules at {:?}", ignore_path);
            Vec::new()
        };

        tracing::debug!(
            "Loaded {} hosts and {} ignore rules from {:?}",
            hosts.len(),
            ignore_rules.len(),
            dir
        );

        Ok(Self {
            config,
            hosts,
            ignore_rules,
        })
    }

    /// Default config directory (`$HOME/inventory`)
    pub fn default_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("LOGSIFT_CONFIG_DIR") {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .map(|p| p.join("inventory"))
            .unwrap_or_else(|| PathBuf::from("./inventory"))
    }
}

/// Load the host inventory
pub fn load_hosts(path: &Path) -> Result<BTreeMap<String, HostEntry>, ConfigError> {
    let content = read(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Load the ignore-rule list
pub fn load_ignore_rules(path: &Path) -> Result<Vec<IgnoreRule>, ConfigError> {
    let content = read(path)?;
    let file: IgnoreFile = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    for (i, rule) in file.rule.iter().enumerate() {
        if rule.criteria_count() == 0 {
            tracing::warn!("Ignore rule #{} in {:?} has no criteria and is skipped", i, path);
        }
    }

    Ok(file.rule)
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory {0:?} does not exist")]
    MissingDir(PathBuf),

    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate default config files, keyed by file name
pub fn generate_default_config() -> Vec<(&'static str, String)> {
    vec![
        (
            SETTINGS_FILE,
            r#"# Logsift Configuration
#
# Environment variables override these settings:
# - LOGSIFT_URL (comma-separated)
# - LOGSIFT_USER
# - LOGSIFT_LOG_LEVEL
# - LOGSIFT_LOG_FORMAT

[search]
# Backend URLs, tried in order on connection failure
urls = ["https://localhost:9200"]

# Index patterns searched
index_patterns = ["syslog-*"]

# Basic auth user
username = ""

# Environment variable with the password (prompted when unset)
password_env = "LOGSIFT_PASSWORD"

# Skip TLS certificate validation
accept_invalid_certs = true

# Request timeout in seconds
request_timeout_secs = 30

# Time zone of absolute -d windows
time_zone = "+03:00"

[display]
# Result cap (override with -r)
max_records = 500

# Width used when the terminal size is unknown
terminal_width = 120

# Newest records first
descending = false

[ignore]
# Apply ignore.toml rules (also enabled with --ignore)
enabled = false

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#
            .to_string(),
        ),
        (
            HOSTS_FILE,
            r#"# Host inventory: logical name -> hostname and groups
#
# [core-rtr01]
# hostname = "core-rtr01.example.net"
# groups = ["core", "msk"]
"#
            .to_string(),
        ),
        (
            IGNORE_FILE,
            r#"# Ignore rules. Every field a rule sets must match (case-insensitive
# substring) for a record to be suppressed.
#
# [[rule]]
# name = "LINK"          # facility
# type = "UPDOWN"        # mnemonic
# msg = "Loopback"       # message
"#
            .to_string(),
        ),
    ]
}
