//! Errors raised while resolving, building and dispatching commands.
//!
//! [`BuildError`] covers local validation failures; none of them ever
//! reaches the transport. [`DispatchError`] is the single error type returned
//! by [`SessionDispatcher::dispatch`](crate::SessionDispatcher::dispatch) and
//! wraps build failures, transport failures, protocol errors and session
//! state violations. Large or non-cloneable payloads are boxed or wrapped in
//! `Arc` to satisfy the `result_large_err` Clippy lint.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::protocol_error::{ErrorKind, ProtocolError};
use crate::transport::TransportError;

/// The requested command name matched neither a canonical name nor an alias.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown command '{name}'")]
pub struct UnknownCommand {
    /// Name that was looked up.
    pub name: String,
}

/// Argument validation failures raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Arguments were neither a JSON object nor `null`.
    #[error("arguments for '{command}' must be a JSON object, got {actual}")]
    ArgumentsNotObject {
        /// Canonical command name.
        command: String,
        /// JSON kind that was supplied.
        actual: &'static str,
    },
    /// A path variable had no value.
    #[error("command '{command}' is missing path variable '{name}'")]
    MissingPathVariable {
        /// Canonical command name.
        command: String,
        /// Variable name.
        name: String,
    },
    /// A path variable value cannot be written into a URL segment.
    #[error("path variable '{name}' of '{command}' cannot be {actual}")]
    InvalidPathVariable {
        /// Canonical command name.
        command: String,
        /// Variable name.
        name: String,
        /// Description of the rejected value.
        actual: &'static str,
    },
    /// A required parameter was absent.
    #[error("command '{command}' is missing required parameter '{name}'")]
    MissingRequiredParameter {
        /// Canonical command name.
        command: String,
        /// Parameter name.
        name: String,
    },
    /// A parameter value does not match its declared type.
    #[error("parameter '{name}' of '{command}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Canonical command name.
        command: String,
        /// Parameter name.
        name: String,
        /// Declared type.
        expected: String,
        /// JSON kind that was supplied.
        actual: &'static str,
    },
}

/// Errors returned by the session dispatcher.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The command name is not in the registry.
    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommand),

    /// Argument validation failed; nothing was sent.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The transport failed to complete the exchange.
    #[error("transport failure during '{command}': {source}")]
    Transport {
        /// Canonical command name.
        command: String,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// The effective deadline elapsed before the remote end replied.
    #[error("command '{command}' timed out after {timeout:?}")]
    Timeout {
        /// Canonical command name.
        command: String,
        /// Deadline that elapsed.
        timeout: Duration,
    },

    /// The session was cancelled while the command was pending.
    #[error("command '{command}' was cancelled")]
    Cancelled {
        /// Canonical command name.
        command: String,
    },

    /// The remote end reported a protocol error.
    #[error(transparent)]
    Protocol(Box<ProtocolError>),

    /// The response did not follow the envelope format.
    #[error("malformed response to '{command}' (HTTP {status}): {reason}")]
    MalformedResponse {
        /// Canonical command name.
        command: String,
        /// HTTP status of the response.
        status: u16,
        /// What was wrong with the response.
        reason: String,
    },

    /// The command needs a session but none has been started.
    #[error("command '{command}' requires a session, but none has been started")]
    SessionNotStarted {
        /// Canonical command name.
        command: String,
    },

    /// The session has ended; no further commands are accepted.
    #[error("command '{command}' rejected: the session has been terminated")]
    SessionTerminated {
        /// Canonical command name.
        command: String,
    },

    /// `newSession` was issued while a session is already active.
    #[error("a session is already active with id '{session_id}'")]
    SessionAlreadyStarted {
        /// Identifier of the active session.
        session_id: String,
    },

    /// The dispatcher worker thread could not be started.
    #[error("failed to start dispatcher worker: {source}")]
    WorkerSpawn {
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The dispatcher worker stopped unexpectedly.
    #[error("dispatcher worker stopped: {reason}")]
    WorkerStopped {
        /// Description of how the worker was lost.
        reason: String,
    },
}

impl DispatchError {
    /// Returns the protocol error kind when the remote end reported one.
    #[must_use]
    pub fn protocol_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Protocol(error) => Some(error.kind()),
            _ => None,
        }
    }

    /// Returns `true` when the failure was detected locally before any
    /// request could be sent.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::UnknownCommand(_)
                | Self::Build(_)
                | Self::SessionNotStarted { .. }
                | Self::SessionTerminated { .. }
                | Self::SessionAlreadyStarted { .. }
        )
    }
}

impl From<ProtocolError> for DispatchError {
    fn from(error: ProtocolError) -> Self {
        Self::Protocol(Box::new(error))
    }
}
