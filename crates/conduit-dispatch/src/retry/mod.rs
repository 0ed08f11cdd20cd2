//! Retry policy for connection failures.
//!
//! Only failures that happened before a request was sent are retried, and
//! only for `GET` commands, so a retry can never repeat a side effect on the
//! remote end.

use std::thread;
use std::time::Duration;

use conduit_schema::HttpMethod;
use tracing::warn;

use crate::transport::{CancelToken, RawResponse, TransportError};

const RETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::retry");

/// Bounded retry budget with a fixed back-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` extra attempts.
    #[must_use]
    pub const fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Extra attempts permitted after the first.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Returns `true` when the failed attempt `attempt` (one-based) may be
    /// repeated.
    #[must_use]
    pub const fn permits(&self, method: HttpMethod, error: &TransportError, attempt: u32) -> bool {
        matches!(method, HttpMethod::Get) && error.is_pre_request() && attempt <= self.max_retries
    }

    /// Runs `send` until it succeeds, fails in a way the policy does not
    /// retry, exhausts the budget, or `cancel` is tripped.
    ///
    /// `send` receives the one-based attempt number.
    ///
    /// # Errors
    ///
    /// Returns the last transport error, or [`TransportError::Cancelled`]
    /// when cancellation interrupted the retries.
    pub fn run<F>(
        &self,
        method: HttpMethod,
        cancel: &CancelToken,
        mut send: F,
    ) -> Result<RawResponse, TransportError>
    where
        F: FnMut(u32) -> Result<RawResponse, TransportError>,
    {
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(TransportError::Cancelled);
            }
            match send(attempt) {
                Err(error) if self.permits(method, &error, attempt) => {
                    warn!(
                        target: RETRY_TARGET,
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "retrying after connection failure"
                    );
                    thread::sleep(self.backoff);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests;
