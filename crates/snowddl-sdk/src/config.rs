//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document is malformed.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable holds an unusable value.
    #[error("invalid value `{value}` for {name}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Settings shared by every operation of a [`crate::Client`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Statement timeout applied when the context carries no deadline.
    pub statement_timeout_secs: Option<u64>,
    /// Account locator used when the context does not name one.
    pub account_locator: Option<String>,
    /// Log statement text at debug level.
    pub log_sql: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            statement_timeout_secs: None,
            account_locator: None,
            log_sql: true,
        }
    }
}

impl ClientConfig {
    /// Environment variable holding the statement timeout in seconds.
    pub const ENV_STATEMENT_TIMEOUT: &'static str = "SNOWDDL_STATEMENT_TIMEOUT_SECS";
    /// Environment variable holding the account locator.
    pub const ENV_ACCOUNT_LOCATOR: &'static str = "SNOWDDL_ACCOUNT_LOCATOR";
    /// Environment variable toggling statement logging.
    pub const ENV_LOG_SQL: &'static str = "SNOWDDL_LOG_SQL";

    /// Returns the default statement timeout.
    #[must_use]
    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_secs.map(Duration::from_secs)
    }

    /// Parses a JSON document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads `SNOWDDL_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Reads settings through `var`, starting from the defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = var(Self::ENV_STATEMENT_TIMEOUT) {
            let secs = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: Self::ENV_STATEMENT_TIMEOUT,
                value: value.clone(),
            })?;
            config.statement_timeout_secs = Some(secs);
        }
        if let Some(value) = var(Self::ENV_ACCOUNT_LOCATOR) {
            if !value.trim().is_empty() {
                config.account_locator = Some(value.trim().to_string());
            }
        }
        if let Some(value) = var(Self::ENV_LOG_SQL) {
            config.log_sql = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: Self::ENV_LOG_SQL,
                        value,
                    })
                }
            };
        }

        Ok(config)
    }
}
