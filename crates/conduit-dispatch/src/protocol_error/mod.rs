//! Typed WebDriver error taxonomy.
//!
//! Remote ends report failures as an error code string inside the response
//! envelope. [`ErrorKind`] maps those strings through one declarative table
//! and falls back to [`ErrorKind::Unrecognised`] for codes the table does not
//! know, keeping the original string on the [`ProtocolError`].

use serde_json::Value;
use thiserror::Error;

/// Kinds of error a remote end can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The click target was obscured by another element.
    ElementClickIntercepted,
    /// The element cannot be interacted with.
    ElementNotInteractable,
    /// The remote end hit a certificate warning.
    InsecureCertificate,
    /// An argument was invalid or malformed.
    InvalidArgument,
    /// A cookie was set for a different domain.
    InvalidCookieDomain,
    /// The element is in a state that forbids the command.
    InvalidElementState,
    /// An element selector was invalid.
    InvalidSelector,
    /// The session id is unknown to the remote end.
    InvalidSessionId,
    /// Script evaluation raised an error.
    JavascriptError,
    /// A pointer action targeted a point outside the viewport.
    MoveTargetOutOfBounds,
    /// No user prompt is open.
    NoSuchAlert,
    /// No cookie matched the given name.
    NoSuchCookie,
    /// No element matched the given locator.
    NoSuchElement,
    /// No frame matched the given reference.
    NoSuchFrame,
    /// The target window no longer exists.
    NoSuchWindow,
    /// The element has no shadow root.
    NoSuchShadowRoot,
    /// Script evaluation exceeded the session script timeout.
    ScriptTimeout,
    /// A new session could not be created.
    SessionNotCreated,
    /// The referenced element is no longer attached to the document.
    StaleElementReference,
    /// The referenced shadow root is no longer attached to the document.
    DetachedShadowRoot,
    /// An operation exceeded a session timeout.
    Timeout,
    /// A cookie could not be stored.
    UnableToSetCookie,
    /// A screenshot could not be taken.
    UnableToCaptureScreen,
    /// A user prompt blocked the command.
    UnexpectedAlertOpen,
    /// The remote end does not know the endpoint.
    UnknownCommand,
    /// The remote end failed in an unspecified way.
    UnknownError,
    /// The endpoint exists but not for the HTTP method used.
    UnknownMethod,
    /// The remote end does not support the operation.
    UnsupportedOperation,
    /// An error code absent from the table.
    Unrecognised,
}

/// Wire code, kind and W3C HTTP status for every known error.
const ERROR_TABLE: &[(&str, ErrorKind, u16)] = &[
    ("element click intercepted", ErrorKind::ElementClickIntercepted, 400),
    ("element not interactable", ErrorKind::ElementNotInteractable, 400),
    ("insecure certificate", ErrorKind::InsecureCertificate, 400),
    ("invalid argument", ErrorKind::InvalidArgument, 400),
    ("invalid cookie domain", ErrorKind::InvalidCookieDomain, 400),
    ("invalid element state", ErrorKind::InvalidElementState, 400),
    ("invalid selector", ErrorKind::InvalidSelector, 400),
    ("invalid session id", ErrorKind::InvalidSessionId, 404),
    ("javascript error", ErrorKind::JavascriptError, 500),
    ("move target out of bounds", ErrorKind::MoveTargetOutOfBounds, 500),
    ("no such alert", ErrorKind::NoSuchAlert, 404),
    ("no such cookie", ErrorKind::NoSuchCookie, 404),
    ("no such element", ErrorKind::NoSuchElement, 404),
    ("no such frame", ErrorKind::NoSuchFrame, 404),
    ("no such window", ErrorKind::NoSuchWindow, 404),
    ("no such shadow root", ErrorKind::NoSuchShadowRoot, 404),
    ("script timeout", ErrorKind::ScriptTimeout, 500),
    ("session not created", ErrorKind::SessionNotCreated, 500),
    ("stale element reference", ErrorKind::StaleElementReference, 404),
    ("detached shadow root", ErrorKind::DetachedShadowRoot, 404),
    ("timeout", ErrorKind::Timeout, 500),
    ("unable to set cookie", ErrorKind::UnableToSetCookie, 500),
    ("unable to capture screen", ErrorKind::UnableToCaptureScreen, 500),
    ("unexpected alert open", ErrorKind::UnexpectedAlertOpen, 500),
    ("unknown command", ErrorKind::UnknownCommand, 404),
    ("unknown error", ErrorKind::UnknownError, 500),
    ("unknown method", ErrorKind::UnknownMethod, 405),
    ("unsupported operation", ErrorKind::UnsupportedOperation, 500),
];

impl ErrorKind {
    /// Maps a wire error code to its kind.
    #[must_use]
    pub fn from_wire(code: &str) -> Self {
        ERROR_TABLE
            .iter()
            .find(|(wire, _, _)| *wire == code)
            .map_or(Self::Unrecognised, |&(_, kind, _)| kind)
    }

    /// Returns the wire error code, or `None` for [`ErrorKind::Unrecognised`].
    #[must_use]
    pub fn wire_code(self) -> Option<&'static str> {
        self.entry().map(|&(wire, _, _)| wire)
    }

    /// Returns the HTTP status the protocol assigns to this kind.
    #[must_use]
    pub fn http_status(self) -> Option<u16> {
        self.entry().map(|&(_, _, status)| status)
    }

    /// Returns `true` for kinds after which the session is unusable.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::SessionNotCreated | Self::InvalidSessionId)
    }

    fn entry(self) -> Option<&'static (&'static str, Self, u16)> {
        ERROR_TABLE.iter().find(|(_, kind, _)| *kind == self)
    }
}

/// Error reported by the remote end inside a response envelope.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("command '{command}' failed with '{error}' (HTTP {status}): {message}")]
pub struct ProtocolError {
    command: String,
    kind: ErrorKind,
    error: String,
    message: String,
    stacktrace: String,
    data: Option<Value>,
    status: u16,
}

impl ProtocolError {
    /// Creates an error from the fields of an error envelope.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        status: u16,
        error: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let error = error.into();
        Self {
            command: command.into(),
            kind: ErrorKind::from_wire(&error),
            error,
            message: message.into(),
            stacktrace: String::new(),
            data: None,
            status,
        }
    }

    /// Attaches the remote stack trace.
    #[must_use]
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = stacktrace.into();
        self
    }

    /// Attaches vendor-specific error data.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Canonical name of the command that failed.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Typed error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error code exactly as reported by the remote end.
    #[must_use]
    pub fn error_code(&self) -> &str {
        &self.error
    }

    /// Remote error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Remote stack trace, empty when none was reported.
    #[must_use]
    pub fn stacktrace(&self) -> &str {
        &self.stacktrace
    }

    /// Vendor-specific error data.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// HTTP status of the response that carried the error.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns `true` when the session can no longer be used.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}
