//! Loosely-typed schema source documents.
//!
//! Schema data arrives as a JSON document keyed by endpoint template and then
//! by HTTP method:
//!
//! ```json
//! {
//!     "/session/:sessionId/url": {
//!         "POST": {
//!             "command": "navigateTo",
//!             "parameters": [{ "name": "url", "type": "string", "required": true }],
//!             "alternativeCommands": ["browser/url"]
//!         }
//!     }
//! }
//! ```
//!
//! [`ProtocolSource::into_definitions`] turns the raw entries into typed
//! [`CommandDefinition`]s, decomposing every type string on the way. The
//! `:sessionId` placeholder is implicit in the source format; every other
//! placeholder must be declared under `variables`.
//!
//! Both map levels keep every entry in document order, so a repeated
//! endpoint or method key reaches the registry as a second definition and
//! fails the load instead of silently replacing the first.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::definition::{
    CommandDefinition, HttpMethod, Parameter, PathVariable, ReturnSpec, SESSION_ID_VARIABLE,
    placeholders,
};
use crate::error::SchemaError;
use crate::param_type::ParamType;

/// A parsed but not yet validated schema document.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ProtocolSource {
    endpoints: Entries<Entries<RawCommand>>,
}

/// JSON object entries in document order, duplicates included.
#[derive(Debug, Clone)]
struct Entries<V>(Vec<(String, V)>);

impl<V> Entries<V> {
    const fn len(&self) -> usize {
        self.0.len()
    }
}

impl<V> IntoIterator for Entries<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

struct EntriesVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
    type Value = Entries<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, V>()? {
            entries.push(entry);
        }
        Ok(Entries(entries))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawCommand {
    command: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    parameters: Option<Vec<RawParameter>>,
    #[serde(default)]
    variables: Vec<RawVariable>,
    returns: Option<RawReturn>,
    #[serde(default, rename = "alternativeCommands")]
    alternative_commands: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawParameter {
    name: String,
    #[serde(rename = "type")]
    type_spec: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    required: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct RawVariable {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawReturn {
    #[serde(rename = "type")]
    type_spec: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
}

impl ProtocolSource {
    /// Parses a schema document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidSource`] when the text is not JSON or
    /// does not follow the source format.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(text).map_err(SchemaError::from_json_error)
    }

    /// Parses a schema document from an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidSource`] when the value does not follow
    /// the source format.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SchemaError> {
        serde_json::from_value(value).map_err(SchemaError::from_json_error)
    }

    /// Returns the number of command entries in the document.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.endpoints.0.iter().map(|(_, methods)| methods.len()).sum()
    }

    /// Converts every entry into a typed definition.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] naming the first entry with an unsupported
    /// method, a missing parameter list or an undecomposable type string.
    pub fn into_definitions(self) -> Result<Vec<CommandDefinition>, SchemaError> {
        let mut definitions = Vec::with_capacity(self.command_count());
        for (endpoint, methods) in self.endpoints {
            for (method_key, raw) in methods {
                let method: HttpMethod =
                    method_key
                        .parse()
                        .map_err(|_| SchemaError::UnsupportedMethod {
                            endpoint: endpoint.clone(),
                            method: method_key.clone(),
                        })?;
                definitions.push(raw.into_definition(&endpoint, method)?);
            }
        }
        Ok(definitions)
    }
}

impl RawCommand {
    fn into_definition(
        self,
        endpoint: &str,
        method: HttpMethod,
    ) -> Result<CommandDefinition, SchemaError> {
        let Self {
            command,
            description,
            reference,
            parameters,
            variables,
            returns,
            alternative_commands,
        } = self;

        if command.trim().is_empty() {
            return Err(SchemaError::EmptyCommandName {
                endpoint: endpoint.to_owned(),
                method: method.to_string(),
            });
        }
        let Some(raw_parameters) = parameters else {
            return Err(SchemaError::MissingParameters {
                command,
                endpoint: endpoint.to_owned(),
                method: method.to_string(),
            });
        };

        let parameters = raw_parameters
            .into_iter()
            .map(|raw| {
                let param_type =
                    ParamType::parse(&raw.type_spec).map_err(|source| SchemaError::InvalidType {
                        command: command.clone(),
                        field: raw.name.clone(),
                        source,
                    })?;
                Ok(Parameter::new(raw.name, param_type, raw.required)
                    .with_description(raw.description))
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        let returns = returns
            .map(|raw| {
                ParamType::parse(&raw.type_spec)
                    .map(|ty| ReturnSpec::new(ty, raw.name, raw.description))
                    .map_err(|source| SchemaError::InvalidType {
                        command: command.clone(),
                        field: String::from("returns"),
                        source,
                    })
            })
            .transpose()?;

        let declared = variables
            .into_iter()
            .map(|raw| PathVariable::new(raw.name, raw.description))
            .collect();
        let variables = with_implicit_session(endpoint, declared);

        let mut definition = CommandDefinition::new(endpoint, method, command)
            .with_documentation(description, reference)
            .with_parameters(parameters)
            .with_variables(variables)
            .with_aliases(alternative_commands);
        if let Some(spec) = returns {
            definition = definition.with_returns(spec);
        }
        Ok(definition)
    }
}

/// Inserts the implicit `sessionId` variable at its template position when
/// the source leaves it undeclared.
fn with_implicit_session(endpoint: &str, mut declared: Vec<PathVariable>) -> Vec<PathVariable> {
    let names = placeholders(endpoint);
    let Some(position) = names.iter().position(|name| *name == SESSION_ID_VARIABLE) else {
        return declared;
    };
    if declared.iter().any(PathVariable::is_session_bound) {
        return declared;
    }
    let session = PathVariable::new(SESSION_ID_VARIABLE, "the id of the current session");
    declared.insert(position.min(declared.len()), session);
    declared
}
