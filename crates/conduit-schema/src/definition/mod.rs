//! Command definition types.
//!
//! A [`CommandDefinition`] is the immutable description of one protocol
//! operation: where it lives, which HTTP method it uses, what arguments it
//! takes and what it returns. Definitions are assembled by the
//! [`Registry`](crate::Registry) loader and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::param_type::ParamType;

/// Name of the path variable bound to the session rather than to caller
/// arguments.
pub const SESSION_ID_VARIABLE: &str = "sessionId";

/// HTTP verb used by a command.
///
/// # Example
///
/// ```
/// use conduit_schema::HttpMethod;
///
/// let method: HttpMethod = "post".parse().expect("known method");
/// assert_eq!(method, HttpMethod::Post);
/// assert!(method.carries_body());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Reads remote state.
    Get,
    /// Sends a JSON body.
    Post,
    /// Removes remote state.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical upper-case verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` when requests with this verb send a JSON body.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        matches!(self, Self::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported HTTP verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method '{0}'")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            _ => Err(UnsupportedMethod(value.to_owned())),
        }
    }
}

/// One caller-supplied argument accepted by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    param_type: ParamType,
    required: bool,
    description: String,
}

impl Parameter {
    /// Creates a parameter with an empty description.
    #[must_use]
    pub fn new(name: impl Into<String>, param_type: ParamType, required: bool) -> Self {
        Self {
            name: name.into(),
            param_type,
            required,
            description: String::new(),
        }
    }

    /// Attaches documentation text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the argument key.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the accepted type.
    #[must_use]
    pub const fn param_type(&self) -> &ParamType {
        &self.param_type
    }

    /// Returns `true` when callers must supply this argument.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the documentation text.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// A named `:placeholder` segment of an endpoint template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathVariable {
    name: String,
    description: String,
}

impl PathVariable {
    /// Creates a path variable.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns the placeholder name without the leading colon.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the documentation text.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns `true` when the value comes from the session, not the caller.
    #[must_use]
    pub fn is_session_bound(&self) -> bool {
        self.name == SESSION_ID_VARIABLE
    }
}

/// Documented shape of a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnSpec {
    return_type: ParamType,
    name: String,
    description: String,
}

impl ReturnSpec {
    /// Creates a return specification.
    #[must_use]
    pub fn new(
        return_type: ParamType,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            return_type,
            name: name.into(),
            description: description.into(),
        }
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn return_type(&self) -> &ParamType {
        &self.return_type
    }

    /// Returns the documented result name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the documentation text.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Immutable description of one protocol operation.
///
/// # Example
///
/// ```
/// use conduit_schema::{CommandDefinition, HttpMethod, Parameter, ParamType};
///
/// let definition = CommandDefinition::new("/session/:sessionId/url", HttpMethod::Post, "navigateTo")
///     .with_variables(vec![conduit_schema::PathVariable::new("sessionId", "")])
///     .with_parameters(vec![Parameter::new("url", ParamType::String, true)])
///     .with_aliases(vec!["browser/url".into()]);
///
/// assert!(definition.requires_session());
/// assert_eq!(definition.parameters().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    endpoint_template: String,
    method: HttpMethod,
    command_name: String,
    description: String,
    reference: Option<String>,
    parameters: Vec<Parameter>,
    variables: Vec<PathVariable>,
    returns: Option<ReturnSpec>,
    alternative_commands: Vec<String>,
}

impl CommandDefinition {
    /// Creates a definition with no parameters, variables, return value or
    /// aliases.
    #[must_use]
    pub fn new(
        endpoint_template: impl Into<String>,
        method: HttpMethod,
        command_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_template: endpoint_template.into(),
            method,
            command_name: command_name.into(),
            description: String::new(),
            reference: None,
            parameters: Vec::new(),
            variables: Vec::new(),
            returns: None,
            alternative_commands: Vec::new(),
        }
    }

    /// Sets the documentation text and upstream reference link.
    #[must_use]
    pub fn with_documentation(
        mut self,
        description: impl Into<String>,
        reference: Option<String>,
    ) -> Self {
        self.description = description.into();
        self.reference = reference;
        self
    }

    /// Sets the ordered parameter list.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Sets the ordered path variable list.
    #[must_use]
    pub fn with_variables(mut self, variables: Vec<PathVariable>) -> Self {
        self.variables = variables;
        self
    }

    /// Declares the successful result shape.
    #[must_use]
    pub fn with_returns(mut self, returns: ReturnSpec) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Sets the alias list.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.alternative_commands = aliases;
        self
    }

    /// Returns the endpoint template with `:name` placeholders.
    #[must_use]
    pub const fn endpoint_template(&self) -> &str {
        self.endpoint_template.as_str()
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the canonical command name.
    #[must_use]
    pub const fn command_name(&self) -> &str {
        self.command_name.as_str()
    }

    /// Returns the documentation text.
    #[must_use]
    pub const fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the link to the upstream protocol text, if any.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Returns the ordered parameters.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Looks up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Returns the ordered path variables.
    #[must_use]
    pub fn variables(&self) -> &[PathVariable] {
        &self.variables
    }

    /// Returns the declared result shape; `None` means the command produces
    /// no value.
    #[must_use]
    pub const fn returns(&self) -> Option<&ReturnSpec> {
        self.returns.as_ref()
    }

    /// Returns the aliases resolving to this command.
    #[must_use]
    pub fn alternative_commands(&self) -> &[String] {
        &self.alternative_commands
    }

    /// Returns `true` when the endpoint is scoped to a session.
    #[must_use]
    pub fn requires_session(&self) -> bool {
        placeholders(&self.endpoint_template).contains(&SESSION_ID_VARIABLE)
    }
}

/// Extracts `:name` placeholders from an endpoint template in left-to-right
/// order.
///
/// Placeholders occupy whole path segments.
///
/// ```
/// use conduit_schema::placeholders;
///
/// assert_eq!(
///     placeholders("/session/:sessionId/element/:elementId/click"),
///     vec!["sessionId", "elementId"],
/// );
/// ```
#[must_use]
pub fn placeholders(template: &str) -> Vec<&str> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .collect()
}
