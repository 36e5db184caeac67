//! Application configuration loaded from environment variables.

use domain::StatusPolicy;
use thiserror::Error;

/// A configuration variable that is set but cannot be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `DATABASE_URL`: Postgres connection string; unset selects the in-memory store
/// - `ADMIN_ALERT_EMAILS`: comma-separated low-stock alert recipients
/// - `ALERT_SENDER`: sender name on alert messages (default: `"Pizza System"`)
/// - `ORDER_STATUS_POLICY`: `sequential` or `unrestricted` (default: `sequential`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub alert_recipients: Vec<String>,
    pub alert_sender: String,
    pub status_policy: StatusPolicy,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: "PORT",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.port,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") => defaults.log_format,
            Some(raw) if raw.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(raw) => {
                return Err(ConfigError::InvalidValue {
                    key: "LOG_FORMAT",
                    value: raw.to_string(),
                    reason: "expected text or json".to_string(),
                });
            }
        };

        let status_policy = match lookup("ORDER_STATUS_POLICY") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "ORDER_STATUS_POLICY",
                value: raw.clone(),
                reason,
            })?,
            None => defaults.status_policy,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            alert_recipients: lookup("ADMIN_ALERT_EMAILS")
                .map(|raw| domain::AlertSettings::parse_recipients(&raw))
                .unwrap_or_default(),
            alert_sender: lookup("ALERT_SENDER").unwrap_or(defaults.alert_sender),
            status_policy,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Low-stock alert settings for the ingredient store.
    pub fn alert_settings(&self) -> domain::AlertSettings {
        domain::AlertSettings {
            recipients: self.alert_recipients.clone(),
            sender: self.alert_sender.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            database_url: None,
            alert_recipients: Vec::new(),
            alert_sender: "Pizza System".to_string(),
            status_policy: StatusPolicy::Sequential,
        }
    }
}
