//! Response parsing: envelope validation and error mapping.
//!
//! Every response body is a JSON object with a `value` key. Error envelopes
//! carry `error`, `message` and `stacktrace` strings inside `value`; they are
//! mapped to a typed [`ProtocolError`]. Successful values are checked against
//! the declared return type, but a mismatch only attaches a
//! [`ResponseShapeError`] warning because the remote end is authoritative.

use conduit_schema::{CommandDefinition, json_kind};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::error::DispatchError;
use crate::protocol_error::ProtocolError;
use crate::transport::RawResponse;

const RESPONSE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::response");

/// A successful value did not match the declared return type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response to '{command}' expected {expected}, got {actual}")]
pub struct ResponseShapeError {
    /// Canonical command name.
    pub command: String,
    /// Declared return type.
    pub expected: String,
    /// JSON kind that was received.
    pub actual: &'static str,
}

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommandResult {
    value: Option<Value>,
    warning: Option<ResponseShapeError>,
}

impl CommandResult {
    /// Result of a command that declares no return value.
    #[must_use]
    pub const fn void() -> Self {
        Self {
            value: None,
            warning: None,
        }
    }

    /// Returned value, `None` for commands without a declared return.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Consumes the result, yielding the returned value.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// Shape warning attached when the value did not match the declared type.
    #[must_use]
    pub const fn warning(&self) -> Option<&ResponseShapeError> {
        self.warning.as_ref()
    }

    /// Returns `true` for commands without a declared return.
    #[must_use]
    pub const fn is_void(&self) -> bool {
        self.value.is_none()
    }
}

/// Failures produced while parsing a response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    /// The remote end reported a protocol error.
    #[error(transparent)]
    Protocol(Box<ProtocolError>),
    /// The body did not follow the envelope format.
    #[error("malformed response to '{command}' (HTTP {status}): {reason}")]
    Malformed {
        /// Canonical command name.
        command: String,
        /// HTTP status of the response.
        status: u16,
        /// What was wrong with the body.
        reason: String,
    },
}

impl From<ResponseError> for DispatchError {
    fn from(error: ResponseError) -> Self {
        match error {
            ResponseError::Protocol(protocol) => Self::Protocol(protocol),
            ResponseError::Malformed {
                command,
                status,
                reason,
            } => Self::MalformedResponse {
                command,
                status,
                reason,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    stacktrace: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl ErrorEnvelope {
    /// Reads an error envelope from `value`.
    ///
    /// Error statuses only need a string `error`; success statuses also need
    /// a string `message` before the value is treated as an error.
    fn read(value: &Value, success_status: bool) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let envelope = Self::deserialize(value).ok()?;
        (!success_status || envelope.message.is_some()).then_some(envelope)
    }

    fn into_error(self, command: &str, status: u16) -> ProtocolError {
        let error = ProtocolError::new(command, status, self.error, self.message.unwrap_or_default())
            .with_stacktrace(self.stacktrace.unwrap_or_default());
        match self.data {
            Some(data) => error.with_data(data),
            None => error,
        }
    }
}

/// Parses a raw response for `definition`.
///
/// # Errors
///
/// Returns [`ResponseError::Protocol`] when the body carries an error
/// envelope and [`ResponseError::Malformed`] when it is not an envelope at
/// all, or when an error status arrives without an error envelope.
pub fn parse_response(
    definition: &CommandDefinition,
    raw: &RawResponse,
) -> Result<CommandResult, ResponseError> {
    let command = definition.command_name();
    let malformed = |reason: String| ResponseError::Malformed {
        command: command.to_owned(),
        status: raw.status(),
        reason,
    };

    let body: Value = serde_json::from_str(raw.body())
        .map_err(|error| malformed(format!("body is not JSON: {error}")))?;
    let kind = json_kind(&body);
    let Value::Object(mut envelope) = body else {
        return Err(malformed(format!("body is a JSON {kind} rather than an object")));
    };
    let Some(value) = envelope.remove("value") else {
        return Err(malformed(String::from("body has no 'value' key")));
    };

    if let Some(error) = ErrorEnvelope::read(&value, raw.is_success()) {
        return Err(ResponseError::Protocol(Box::new(
            error.into_error(command, raw.status()),
        )));
    }
    if !raw.is_success() {
        return Err(malformed(String::from(
            "error status without an error envelope",
        )));
    }
    Ok(success(definition, value))
}

fn success(definition: &CommandDefinition, value: Value) -> CommandResult {
    let Some(returns) = definition.returns() else {
        return CommandResult::void();
    };
    let warning = (!returns.return_type().accepts(&value)).then(|| ResponseShapeError {
        command: definition.command_name().to_owned(),
        expected: returns.return_type().to_string(),
        actual: json_kind(&value),
    });
    if let Some(mismatch) = &warning {
        warn!(
            target: RESPONSE_TARGET,
            command = %mismatch.command,
            expected = %mismatch.expected,
            actual = mismatch.actual,
            "response value does not match the declared return type"
        );
    }
    CommandResult {
        value: Some(value),
        warning,
    }
}

#[cfg(test)]
mod tests;
