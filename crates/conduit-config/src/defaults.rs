//! Default values shared by configuration loading and the dispatcher.

use crate::logging::LogFormat;

/// Deadline applied to commands without a session-specific timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Extra time granted beyond a session script or page-load timeout so the
/// remote end reports its own timeout error first.
pub const DEFAULT_TIMEOUT_GRACE_MS: u64 = 1_000;

/// Extra attempts made after a connection could not be established.
pub const DEFAULT_CONNECTION_RETRY_COUNT: u32 = 3;

/// Pause between connection retries.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}
