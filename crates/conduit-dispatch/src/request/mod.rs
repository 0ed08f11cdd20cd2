//! Request building: path substitution and parameter validation.
//!
//! [`build_request`] turns a definition, the session context and caller
//! arguments into a [`RequestDescriptor`]. It performs no I/O. Every failure
//! is a [`BuildError`] raised before anything reaches the transport.
//!
//! A JSON `null` argument counts as absent unless the declared type admits
//! `null`. Arguments that match no declared parameter are dropped. Path
//! segments are percent-encoded so values such as cookie names cannot alter
//! the route.

use conduit_schema::{
    CommandDefinition, HttpMethod, Parameter, PathVariable, SESSION_ID_VARIABLE, json_kind,
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::BuildError;
use crate::session::SessionContext;

const REQUEST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::request");

/// Characters escaped in a substituted path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Transport-ready description of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    command: String,
    method: HttpMethod,
    url: String,
    body: Option<Value>,
    parameters: Map<String, Value>,
}

impl RequestDescriptor {
    /// Canonical name of the command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path with every placeholder substituted, relative to the remote end's
    /// base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// JSON body; present only for POST, where it is always an object.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Validated parameters, kept for methods that send no body.
    #[must_use]
    pub const fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}

/// Builds the request for `definition`.
///
/// `args` must be a JSON object or `null`. The `sessionId` path variable is
/// always taken from `session`, never from `args`.
///
/// # Errors
///
/// Returns a [`BuildError`] when arguments are not an object, a path
/// variable is missing or not representable in a URL, a required parameter
/// is missing, or a value does not match its declared type.
pub fn build_request(
    definition: &CommandDefinition,
    session: Option<&SessionContext>,
    args: &Value,
) -> Result<RequestDescriptor, BuildError> {
    let empty = Map::new();
    let arguments = match args {
        Value::Object(fields) => fields,
        Value::Null => &empty,
        other => {
            return Err(BuildError::ArgumentsNotObject {
                command: definition.command_name().to_owned(),
                actual: json_kind(other),
            });
        }
    };

    let url = substitute_path(definition, session, arguments)?;
    let parameters = validate_parameters(definition, arguments)?;
    let body = definition
        .method()
        .carries_body()
        .then(|| Value::Object(parameters.clone()));

    debug!(
        target: REQUEST_TARGET,
        command = definition.command_name(),
        method = %definition.method(),
        url = %url,
        parameters = parameters.len(),
        "built request"
    );
    Ok(RequestDescriptor {
        command: definition.command_name().to_owned(),
        method: definition.method(),
        url,
        body,
        parameters,
    })
}

fn substitute_path(
    definition: &CommandDefinition,
    session: Option<&SessionContext>,
    arguments: &Map<String, Value>,
) -> Result<String, BuildError> {
    let mut values = definition.variables().iter();
    let mut segments = Vec::new();
    for segment in definition.endpoint_template().split('/') {
        if segment.starts_with(':') {
            let variable = values
                .next()
                .ok_or_else(|| missing_variable(definition, segment.trim_start_matches(':')))?;
            let value = variable_value(definition, variable, session, arguments)?;
            segments.push(utf8_percent_encode(&value, PATH_SEGMENT).to_string());
        } else {
            segments.push(segment.to_owned());
        }
    }
    Ok(segments.join("/"))
}

fn variable_value(
    definition: &CommandDefinition,
    variable: &PathVariable,
    session: Option<&SessionContext>,
    arguments: &Map<String, Value>,
) -> Result<String, BuildError> {
    if variable.name() == SESSION_ID_VARIABLE {
        return session
            .map(|context| context.session_id().to_owned())
            .ok_or_else(|| missing_variable(definition, variable.name()));
    }
    let text = match arguments.get(variable.name()) {
        None | Some(Value::Null) => return Err(missing_variable(definition, variable.name())),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(other) => {
            return Err(BuildError::InvalidPathVariable {
                command: definition.command_name().to_owned(),
                name: variable.name().to_owned(),
                actual: json_kind(other),
            });
        }
    };
    let rejected = match text.as_str() {
        "" => Some("an empty string"),
        "." | ".." => Some("a dot segment"),
        _ => None,
    };
    if let Some(actual) = rejected {
        return Err(BuildError::InvalidPathVariable {
            command: definition.command_name().to_owned(),
            name: variable.name().to_owned(),
            actual,
        });
    }
    Ok(text)
}

fn validate_parameters(
    definition: &CommandDefinition,
    arguments: &Map<String, Value>,
) -> Result<Map<String, Value>, BuildError> {
    let mut accepted = Map::new();
    for parameter in definition.parameters() {
        match supplied(parameter, arguments) {
            None if parameter.is_required() => {
                return Err(BuildError::MissingRequiredParameter {
                    command: definition.command_name().to_owned(),
                    name: parameter.name().to_owned(),
                });
            }
            None => {}
            Some(value) if parameter.param_type().accepts(value) => {
                accepted.insert(parameter.name().to_owned(), value.clone());
            }
            Some(value) => {
                return Err(BuildError::TypeMismatch {
                    command: definition.command_name().to_owned(),
                    name: parameter.name().to_owned(),
                    expected: parameter.param_type().to_string(),
                    actual: json_kind(value),
                });
            }
        }
    }

    let dropped = arguments
        .keys()
        .filter(|key| definition.parameter(key).is_none() && !is_variable(definition, key))
        .count();
    if dropped > 0 {
        debug!(
            target: REQUEST_TARGET,
            command = definition.command_name(),
            dropped,
            "dropped undeclared arguments"
        );
    }
    Ok(accepted)
}

fn supplied<'a>(parameter: &Parameter, arguments: &'a Map<String, Value>) -> Option<&'a Value> {
    match arguments.get(parameter.name()) {
        Some(Value::Null) if !parameter.param_type().admits_null() => None,
        other => other,
    }
}

fn is_variable(definition: &CommandDefinition, key: &str) -> bool {
    definition
        .variables()
        .iter()
        .any(|variable| variable.name() == key)
}

fn missing_variable(definition: &CommandDefinition, name: &str) -> BuildError {
    BuildError::MissingPathVariable {
        command: definition.command_name().to_owned(),
        name: name.to_owned(),
    }
}
