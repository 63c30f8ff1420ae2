//! Configuration management for rtrkeys services

use config::ConfigError;
use serde::Deserialize;
use std::env;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines (for production)
    Json,
    /// Human-readable (for development)
    Console,
}

/// Network namespace (VRF) configuration for cache connections
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetnsConfig {
    /// Whether sockets may be created inside a named namespace
    pub enabled: bool,
    /// Namespace name or absolute path, if any
    pub namespace: Option<String>,
}

/// Router key table configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableConfig {
    /// Number of keys to reserve room for up front
    pub initial_capacity: usize,
    /// Emit a structured log event for every key change
    pub notify_updates: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            notify_updates: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub log_format: LogFormat,
    pub netns: NetnsConfig,
    pub table: TableConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("RTRKEYS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let log_format = match lookup("RTRKEYS_LOG_FORMAT").as_deref() {
            None | Some("console") => LogFormat::Console,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Message(format!(
                    "RTRKEYS_LOG_FORMAT must be 'json' or 'console', got '{}'",
                    other
                )))
            }
        };

        let netns = NetnsConfig {
            enabled: lookup("RTRKEYS_NETNS_ENABLE")
                .map(|v| parse_bool("RTRKEYS_NETNS_ENABLE", &v))
                .transpose()?
                .unwrap_or(false),
            namespace: lookup("RTRKEYS_NETNS_NAME").filter(|name| !name.is_empty()),
        };

        let defaults = TableConfig::default();
        let table = TableConfig {
            initial_capacity: lookup("RTRKEYS_TABLE_CAPACITY")
                .map(|v| {
                    v.parse::<usize>().map_err(|e| {
                        ConfigError::Message(format!("RTRKEYS_TABLE_CAPACITY: {}", e))
                    })
                })
                .transpose()?
                .unwrap_or(defaults.initial_capacity),
            notify_updates: lookup("RTRKEYS_TABLE_NOTIFY")
                .map(|v| parse_bool("RTRKEYS_TABLE_NOTIFY", &v))
                .transpose()?
                .unwrap_or(defaults.notify_updates),
        };

        Ok(Self {
            log_level: Some(log_level),
            log_format,
            netns,
            table,
        })
    }

    /// Get log level, defaulting to "info"
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Message(format!(
            "{} must be a boolean, got '{}'",
            name, other
        ))),
    }
}
