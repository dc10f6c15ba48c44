//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Sections that must be present in every config file.
const REQUIRED_SECTIONS: [&str; 3] = ["api", "notification", "storage"];

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream store API settings
    pub api: ApiConfig,

    /// Seen-games table settings
    pub storage: StorageConfig,

    /// Webhook notification settings
    pub notification: NotificationConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    ///
    /// Every failure is reported as a configuration error naming the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Cannot read config file {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(_) => e,
            other => AppError::config(format!("Invalid config file {}: {other}", path.display())),
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table = content.parse()?;

        for section in REQUIRED_SECTIONS {
            if !table.contains_key(section) {
                return Err(AppError::config(format!(
                    "Missing required config section: {section}"
                )));
            }
        }

        let config: Config = toml::Value::Table(table).try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::config("api.base_url is required"));
        }
        url::Url::parse(&self.api.base_url)
            .map_err(|e| AppError::config(format!("api.base_url is not a valid URL: {e}")))?;
        if self.api.timeout_secs == 0 {
            return Err(AppError::config("api.timeout_secs must be > 0"));
        }
        if self.notification.target_url.trim().is_empty() {
            return Err(AppError::config("notification.target_url is required"));
        }
        if parse_color(&self.notification.embed_color).is_none() {
            return Err(AppError::config(format!(
                "notification.embed_color is not a hex color: {}",
                self.notification.embed_color
            )));
        }
        if self.notification.timeout_secs == 0 {
            return Err(AppError::config("notification.timeout_secs must be > 0"));
        }
        if self.storage.seen_games_file.as_os_str().is_empty() {
            return Err(AppError::config("storage.seen_games_file is empty"));
        }
        Ok(())
    }
}

/// Upstream store API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint listing the free-games component
    pub base_url: String,

    /// Query parameters sent with every request
    #[serde(default)]
    pub default_params: BTreeMap<String, toml::Value>,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::api_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Query parameters rendered as strings.
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.default_params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// Seen-games table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Location of the JSON table
    #[serde(default = "defaults::seen_games_file")]
    pub seen_games_file: PathBuf,

    /// Drop or flag listings that are no longer free
    #[serde(default)]
    pub remove_disappeared_games: bool,

    /// Keep disappeared listings, flagged `ever_removed`, instead of dropping them
    #[serde(default)]
    pub renotify_returned_games: bool,
}

/// Webhook notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook endpoint
    #[serde(default)]
    pub target_url: String,

    /// Display name of the posting bot
    #[serde(default = "defaults::sender_name")]
    pub sender_name: String,

    /// Embed side color, hex with optional `#`
    #[serde(default = "defaults::embed_color")]
    pub embed_color: String,

    /// Pause between two notifications in seconds
    #[serde(default = "defaults::delay_between_sends")]
    pub delay_between_sends: u64,

    /// Request timeout in seconds
    #[serde(default = "defaults::notification_timeout")]
    pub timeout_secs: u64,
}

impl NotificationConfig {
    /// Embed color as an RGB integer. Zero if unparseable.
    pub fn color(&self) -> u32 {
        parse_color(&self.embed_color).unwrap_or(0)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_secs(self.delay_between_sends)
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Append log lines to `file`
    #[serde(default = "defaults::logging_enabled")]
    pub enabled: bool,

    /// Log file path
    #[serde(default = "defaults::log_file")]
    pub file: PathBuf,

    /// Also write log lines to stdout
    #[serde(default)]
    pub echo: bool,

    /// Minimum level: error, warn, info, debug
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::logging_enabled(),
            file: defaults::log_file(),
            echo: false,
            level: defaults::log_level(),
        }
    }
}

/// Parse `#rrggbb`, `rrggbb` or `0xrrggbb`.
pub fn parse_color(value: &str) -> Option<u32> {
    let hex = value.trim();
    let hex = hex
        .strip_prefix('#')
        .or_else(|| hex.strip_prefix("0x"))
        .unwrap_or(hex);
    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

mod defaults {
    use std::path::PathBuf;

    // API defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.6943.143 Safari/537.36".into()
    }
    pub fn api_timeout() -> u64 {
        30
    }

    // Storage defaults
    pub fn seen_games_file() -> PathBuf {
        PathBuf::from("storage/seen_games.json")
    }

    // Notification defaults
    pub fn sender_name() -> String {
        "STOVENotify".into()
    }
    pub fn embed_color() -> String {
        "#00ff00".into()
    }
    pub fn delay_between_sends() -> u64 {
        1
    }
    pub fn notification_timeout() -> u64 {
        10
    }

    // Logging defaults
    pub fn logging_enabled() -> bool {
        true
    }
    pub fn log_file() -> PathBuf {
        PathBuf::from("logs/stovenotify.log")
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
