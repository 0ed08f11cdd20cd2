//! Dispatcher settings derived from configuration.

use std::time::Duration;

use conduit_config::Config;

use crate::retry::RetryPolicy;

/// Runtime settings for a [`SessionDispatcher`](crate::SessionDispatcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherSettings {
    default_timeout: Duration,
    timeout_grace: Duration,
    retry: RetryPolicy,
    terminate_on_transport_error: bool,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DispatcherSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_timeout: Duration::from_millis(config.default_timeout_ms),
            timeout_grace: Duration::from_millis(config.timeout_grace_ms),
            retry: RetryPolicy::new(
                config.connection_retry_count,
                Duration::from_millis(config.retry_backoff_ms),
            ),
            terminate_on_transport_error: config.terminate_on_transport_error,
        }
    }
}

impl DispatcherSettings {
    /// Replaces the default deadline.
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Replaces the grace period added to session timeouts.
    #[must_use]
    pub const fn with_timeout_grace(mut self, grace: Duration) -> Self {
        self.timeout_grace = grace;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets whether transport failures terminate the session.
    #[must_use]
    pub const fn with_terminate_on_transport_error(mut self, terminate: bool) -> Self {
        self.terminate_on_transport_error = terminate;
        self
    }

    /// Deadline for commands without a session-specific timeout.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Grace period added to script and page-load deadlines.
    #[must_use]
    pub const fn timeout_grace(&self) -> Duration {
        self.timeout_grace
    }

    /// Retry policy for connection failures.
    #[must_use]
    pub const fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Whether transport failures terminate the session.
    #[must_use]
    pub const fn terminate_on_transport_error(&self) -> bool {
        self.terminate_on_transport_error
    }
}
