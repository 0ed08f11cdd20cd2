//! Errors raised while loading command schema data.
//!
//! Every variant names the endpoint or command that broke the schema so a
//! failed load can be traced back to the offending entry. Loading is
//! all-or-nothing: the first violation aborts the whole registry build.

use std::sync::Arc;

use thiserror::Error;

/// A type string that could not be decomposed into a [`ParamType`].
///
/// [`ParamType`]: crate::ParamType
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decompose type '{spec}': {reason}")]
pub struct InvalidTypeSpec {
    /// The type string as written in the schema data.
    pub spec: String,
    /// Why the string was rejected.
    pub reason: String,
}

impl InvalidTypeSpec {
    pub(crate) fn new(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}

/// Errors arising while loading or validating schema data.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The schema document is not valid JSON or does not match the source
    /// format.
    #[error("invalid schema source: {message}")]
    InvalidSource {
        /// Human-readable description of the parse failure.
        message: String,
        /// Underlying JSON error, when one exists.
        #[source]
        source: Option<Arc<serde_json::Error>>,
    },

    /// The method key of an endpoint is not GET, POST or DELETE.
    #[error("endpoint '{endpoint}' declares unsupported method '{method}'")]
    UnsupportedMethod {
        /// Endpoint template holding the method.
        endpoint: String,
        /// Method key as written.
        method: String,
    },

    /// A command omitted its `parameters` list.
    #[error("command '{command}' ({method} {endpoint}) has no parameters list")]
    MissingParameters {
        /// Canonical command name.
        command: String,
        /// Endpoint template.
        endpoint: String,
        /// HTTP method.
        method: String,
    },

    /// A command has an empty canonical name.
    #[error("{method} {endpoint} has an empty command name")]
    EmptyCommandName {
        /// Endpoint template.
        endpoint: String,
        /// HTTP method.
        method: String,
    },

    /// A parameter or return type string could not be parsed.
    #[error("command '{command}' field '{field}': {source}")]
    InvalidType {
        /// Canonical command name.
        command: String,
        /// Parameter name, or `returns` for the return type.
        field: String,
        /// The parse failure.
        #[source]
        source: InvalidTypeSpec,
    },

    /// The endpoint template is malformed.
    #[error("command '{command}' has invalid endpoint template '{template}': {reason}")]
    InvalidTemplate {
        /// Canonical command name.
        command: String,
        /// Endpoint template.
        template: String,
        /// Description of the defect.
        reason: String,
    },

    /// Template placeholders and declared path variables disagree.
    #[error(
        "command '{command}' placeholders {placeholders:?} in '{template}' do not match \
         declared variables {variables:?}"
    )]
    VariableMismatch {
        /// Canonical command name.
        command: String,
        /// Endpoint template.
        template: String,
        /// Placeholder names in template order.
        placeholders: Vec<String>,
        /// Declared variable names in declaration order.
        variables: Vec<String>,
    },

    /// A command declares the same parameter twice.
    #[error("command '{command}' declares parameter '{name}' more than once")]
    DuplicateParameter {
        /// Canonical command name.
        command: String,
        /// Repeated parameter name.
        name: String,
    },

    /// Two commands share an endpoint template and method.
    #[error("{method} {endpoint} is claimed by both '{first}' and '{second}'")]
    DuplicateEndpoint {
        /// Endpoint template.
        endpoint: String,
        /// HTTP method.
        method: String,
        /// Command registered first.
        first: String,
        /// Command that collided.
        second: String,
    },

    /// Two commands share a canonical name.
    #[error("command name '{name}' is defined more than once")]
    DuplicateCommand {
        /// Repeated canonical name.
        name: String,
    },

    /// An alias is empty.
    #[error("command '{command}' declares an empty alternative command")]
    EmptyAlias {
        /// Canonical command name.
        command: String,
    },

    /// An alias collides with a canonical name or another alias.
    #[error("alias '{alias}' of command '{command}' collides with '{existing}'")]
    AliasCollision {
        /// The colliding alias.
        alias: String,
        /// Command declaring the alias.
        command: String,
        /// Command already owning the name.
        existing: String,
    },
}

impl SchemaError {
    /// Creates an invalid source error from a JSON error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::InvalidSource {
            message: source.to_string(),
            source: Some(Arc::new(source)),
        }
    }
}
