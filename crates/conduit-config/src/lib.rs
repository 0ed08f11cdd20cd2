//! Configuration and telemetry for the conduit dispatcher.
//!
//! [`Config`] collects the dispatcher's deadlines, retry budget and logging
//! preferences. Every field has a default, so an empty TOML document is a
//! valid configuration; unknown keys are rejected so typos surface early.
//!
//! ```toml
//! default_timeout_ms = 60000
//! connection_retry_count = 1
//! log_format = "compact"
//! ```

mod defaults;
mod error;
mod logging;
pub mod telemetry;


use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_CONNECTION_RETRY_COUNT, DEFAULT_LOG_FILTER, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_TIMEOUT_GRACE_MS, DEFAULT_TIMEOUT_MS, default_log_filter, default_log_format,
};
pub use self::error::ConfigError;
pub use self::logging::{LOG_FILTER_ENV, LogFormat, LogFormatParseError, effective_filter};

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Deadline for commands without a session-specific timeout, in
    /// milliseconds.
    pub default_timeout_ms: u64,
    /// Extra time added to script and page-load deadlines, in milliseconds.
    pub timeout_grace_ms: u64,
    /// Extra attempts made for idempotent commands whose connection could
    /// not be established.
    pub connection_retry_count: u32,
    /// Pause between connection retries, in milliseconds.
    pub retry_backoff_ms: u64,
    /// Terminate the session when the transport fails.
    pub terminate_on_transport_error: bool,
    /// `tracing` filter expression.
    pub log_filter: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            timeout_grace_ms: DEFAULT_TIMEOUT_GRACE_MS,
            connection_retry_count: DEFAULT_CONNECTION_RETRY_COUNT,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            terminate_on_transport_error: false,
            log_filter: defaults::default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::parse(None, source))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read, otherwise
    /// as [`Config::from_toml_str`] with the path attached.
    pub fn load_from_path(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source: source.into(),
        })?;
        let config: Self = toml::from_str(&text)
            .map_err(|source| ConfigError::parse(Some(path.to_path_buf()), source))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable by the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "default_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::invalid("log_filter", "must not be empty"));
        }
        Ok(())
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
