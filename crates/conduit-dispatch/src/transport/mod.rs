//! Transport capability consumed by the session dispatcher.
//!
//! The dispatcher never performs HTTP itself. Hosts inject a [`Transport`]
//! that turns a [`RequestDescriptor`] into a [`RawResponse`] against the
//! remote end's base URL. Each call receives a [`CallContext`] carrying the
//! effective deadline and a [`CancelToken`] the dispatcher trips when the
//! caller stops waiting; long-running transports should poll it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;

use crate::request::RequestDescriptor;

/// Trait abstracting the HTTP round trip for testability.
///
/// # Example
///
/// ```
/// use conduit_dispatch::{CallContext, RawResponse, RequestDescriptor, Transport, TransportError};
///
/// struct StatusOnly;
///
/// impl Transport for StatusOnly {
///     fn send(
///         &self,
///         _request: &RequestDescriptor,
///         _call: &CallContext,
///     ) -> Result<RawResponse, TransportError> {
///         Ok(RawResponse::new(200, r#"{"value":{"ready":true,"message":""}}"#))
///     }
/// }
/// ```
pub trait Transport {
    /// Performs one HTTP request against the remote end.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] when no connection could be
    /// established, so nothing reached the remote end;
    /// [`TransportError::Request`] when the exchange failed after the request
    /// may have been sent; and [`TransportError::TimedOut`] or
    /// [`TransportError::Cancelled`] when the call context asked the
    /// transport to stop.
    fn send(
        &self,
        request: &RequestDescriptor,
        call: &CallContext,
    ) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        request: &RequestDescriptor,
        call: &CallContext,
    ) -> Result<RawResponse, TransportError> {
        (**self).send(request, call)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: &RequestDescriptor,
        call: &CallContext,
    ) -> Result<RawResponse, TransportError> {
        (**self).send(request, call)
    }
}

/// Status code and body text returned by the remote end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    body: String,
}

impl RawResponse {
    /// Creates a response from its status and body text.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns the HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Shared flag used to ask a transport call to stop.
///
/// Clones observe the same flag. Once cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trips the token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once the token has been tripped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Per-call context handed to [`Transport::send`].
#[derive(Debug, Clone)]
pub struct CallContext {
    timeout: Duration,
    cancel: CancelToken,
    attempt: u32,
}

impl CallContext {
    /// Creates the context for the first attempt of a call.
    #[must_use]
    pub const fn new(timeout: Duration, cancel: CancelToken) -> Self {
        Self {
            timeout,
            cancel,
            attempt: 1,
        }
    }

    /// Returns a copy of the context for a later attempt.
    #[must_use]
    pub fn for_attempt(&self, attempt: u32) -> Self {
        Self {
            attempt,
            ..self.clone()
        }
    }

    /// Effective deadline for the whole call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Token tripped when the caller stops waiting.
    #[must_use]
    pub const fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Returns `true` once the caller has stopped waiting.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// One-based attempt number.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

/// Failures reported by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No connection could be established; the request was never sent.
    #[error("failed to connect to remote end: {message}")]
    Connect {
        /// Human-readable failure description.
        message: String,
    },
    /// The exchange failed after the request may have reached the remote end.
    #[error("request to remote end failed: {message}")]
    Request {
        /// Human-readable failure description.
        message: String,
    },
    /// The transport gave up after the call deadline elapsed.
    #[error("transport deadline elapsed")]
    TimedOut,
    /// The transport stopped because the call was cancelled.
    #[error("transport call cancelled")]
    Cancelled,
}

impl TransportError {
    /// Creates a [`TransportError::Connect`].
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a [`TransportError::Request`].
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Returns `true` when the failure happened before anything was sent.
    #[must_use]
    pub const fn is_pre_request(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }
}

#[cfg(test)]
mod tests;
