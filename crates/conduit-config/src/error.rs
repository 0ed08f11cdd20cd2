//! Errors raised while loading dispatcher configuration.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors encountered while reading, parsing or validating configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
    /// The configuration text is not valid TOML for [`crate::Config`].
    #[error("failed to parse configuration{}: {source}", describe_origin(.path.as_ref()))]
    Parse {
        /// Path of the configuration file, when loaded from disk.
        path: Option<Utf8PathBuf>,
        /// Underlying TOML error.
        #[source]
        source: Arc<toml::de::Error>,
    },
    /// A field holds a value outside its permitted range.
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(path: Option<Utf8PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path,
            source: Arc::new(source),
        }
    }
}

fn describe_origin(path: Option<&Utf8PathBuf>) -> String {
    path.map(|value| format!(" '{value}'")).unwrap_or_default()
}
