//! Log output formats and filter selection.
//!
//! Hosts normally pick the filter and format in configuration. Setting
//! [`LOG_FILTER_ENV`] in the environment overrides the configured filter for
//! one run without editing the file, for example
//! `CONDUIT_LOG=conduit_dispatch=debug` to trace every routed command.
//!
//! ```
//! use conduit_config::{Config, LogFormat};
//!
//! let config = Config::from_toml_str(r#"log_format = "compact""#).expect("valid config");
//! assert_eq!(config.log_format(), LogFormat::Compact);
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Environment variable whose value replaces the configured log filter.
pub const LOG_FILTER_ENV: &str = "CONDUIT_LOG";

/// How dispatcher events are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event with fields flattened to the top level, so
    /// `command`, `url` and `elapsed_ms` are directly queryable.
    #[default]
    Json,
    /// Single-line text for interactive runs.
    Compact,
}

/// Error returned when text names no [`LogFormat`].
pub type LogFormatParseError = strum::ParseError;

/// Chooses the filter directives to install.
///
/// A non-blank `override_value` (normally read from [`LOG_FILTER_ENV`]) wins
/// over `configured`; blank overrides are ignored.
#[must_use]
pub fn effective_filter<'a>(configured: &'a str, override_value: Option<&'a str>) -> &'a str {
    override_value
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .unwrap_or(configured)
}
