//! Command registry with endpoint and name lookup.
//!
//! The [`Registry`] holds validated [`CommandDefinition`]s and two indexes
//! built together at load time: one keyed by `(endpoint template, method)`
//! and one keyed by command name, where canonical names and aliases share a
//! single namespace. A registry is immutable once built; share it between
//! sessions behind an `Arc`.

use std::collections::HashMap;

use tracing::debug;

use crate::definition::{CommandDefinition, HttpMethod, PathVariable, placeholders};
use crate::error::SchemaError;
use crate::source::ProtocolSource;

/// Tracing target for registry operations.
const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// The bundled W3C WebDriver command table.
const WEBDRIVER_SCHEMA: &str = include_str!("../../data/webdriver.json");

/// Immutable table of command definitions.
///
/// # Example
///
/// ```
/// use conduit_schema::{HttpMethod, Registry};
///
/// let registry = Registry::webdriver().expect("bundled schema loads");
/// let by_alias = registry.lookup_by_name("browser/url").expect("alias resolves");
/// let by_route = registry
///     .lookup_by_endpoint("/session/:sessionId/url", HttpMethod::Post)
///     .expect("route resolves");
/// assert_eq!(by_alias.command_name(), "navigateTo");
/// assert!(std::ptr::eq(by_alias, by_route));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: Vec<CommandDefinition>,
    by_name: HashMap<String, usize>,
    by_endpoint: HashMap<String, HashMap<HttpMethod, usize>>,
}

impl Registry {
    /// Loads the bundled W3C WebDriver command table.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the bundled data violates a registry
    /// invariant.
    pub fn webdriver() -> Result<Self, SchemaError> {
        Self::from_json_str(WEBDRIVER_SCHEMA)
    }

    /// Parses and loads a schema document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the text cannot be parsed or the
    /// resulting definitions violate a registry invariant.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        Self::load(ProtocolSource::from_json_str(text)?)
    }

    /// Loads a parsed schema document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] naming the first offending entry. Nothing
    /// is partially loaded.
    pub fn load(source: ProtocolSource) -> Result<Self, SchemaError> {
        Self::from_definitions(source.into_definitions()?)
    }

    /// Builds a registry from typed definitions, enforcing every invariant.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] when a template is malformed, placeholders
    /// and variables disagree, a parameter repeats, two commands share a
    /// route or a name, or an alias collides.
    pub fn from_definitions(mut definitions: Vec<CommandDefinition>) -> Result<Self, SchemaError> {
        definitions.sort_by(|a, b| a.command_name().cmp(b.command_name()));
        for definition in &definitions {
            validate_definition(definition)?;
        }

        let mut registry = Self {
            by_name: HashMap::with_capacity(definitions.len()),
            by_endpoint: HashMap::new(),
            definitions: Vec::new(),
        };
        registry.index_endpoints(&definitions)?;
        registry.index_names(&definitions)?;
        registry.definitions = definitions;

        debug!(
            target: REGISTRY_TARGET,
            commands = registry.definitions.len(),
            names = registry.by_name.len(),
            "loaded command registry"
        );
        Ok(registry)
    }

    fn index_endpoints(&mut self, definitions: &[CommandDefinition]) -> Result<(), SchemaError> {
        for (index, definition) in definitions.iter().enumerate() {
            let methods = self
                .by_endpoint
                .entry(definition.endpoint_template().to_owned())
                .or_default();
            if let Some(existing) = methods.insert(definition.method(), index) {
                return Err(SchemaError::DuplicateEndpoint {
                    endpoint: definition.endpoint_template().to_owned(),
                    method: definition.method().to_string(),
                    first: command_at(definitions, existing),
                    second: definition.command_name().to_owned(),
                });
            }
        }
        Ok(())
    }

    fn index_names(&mut self, definitions: &[CommandDefinition]) -> Result<(), SchemaError> {
        for (index, definition) in definitions.iter().enumerate() {
            let name = definition.command_name();
            if self.by_name.insert(name.to_owned(), index).is_some() {
                return Err(SchemaError::DuplicateCommand {
                    name: name.to_owned(),
                });
            }
        }
        for (index, definition) in definitions.iter().enumerate() {
            for alias in definition.alternative_commands() {
                if alias.trim().is_empty() {
                    return Err(SchemaError::EmptyAlias {
                        command: definition.command_name().to_owned(),
                    });
                }
                if let Some(&existing) = self.by_name.get(alias) {
                    return Err(SchemaError::AliasCollision {
                        alias: alias.clone(),
                        command: definition.command_name().to_owned(),
                        existing: command_at(definitions, existing),
                    });
                }
                self.by_name.insert(alias.clone(), index);
            }
        }
        Ok(())
    }

    /// Looks up the definition bound to an endpoint template and method.
    #[must_use]
    pub fn lookup_by_endpoint(&self, template: &str, method: HttpMethod) -> Option<&CommandDefinition> {
        self.by_endpoint
            .get(template)
            .and_then(|methods| methods.get(&method))
            .and_then(|&index| self.definitions.get(index))
    }

    /// Looks up a definition by canonical name or alias.
    #[must_use]
    pub fn lookup_by_name(&self, name: &str) -> Option<&CommandDefinition> {
        self.by_name
            .get(name)
            .and_then(|&index| self.definitions.get(index))
    }

    /// Returns `true` when `name` is an alias rather than a canonical name.
    #[must_use]
    pub fn is_alias(&self, name: &str) -> bool {
        self.lookup_by_name(name)
            .is_some_and(|definition| definition.command_name() != name)
    }

    /// Returns the aliases of the command `name` resolves to, or `None` when
    /// the name is unknown.
    #[must_use]
    pub fn aliases_of(&self, name: &str) -> Option<&[String]> {
        self.lookup_by_name(name)
            .map(CommandDefinition::alternative_commands)
    }

    /// Iterates over all definitions in canonical-name order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.definitions.iter()
    }

    /// Returns the number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` when the registry holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn command_at(definitions: &[CommandDefinition], index: usize) -> String {
    definitions
        .get(index)
        .map(|definition| definition.command_name().to_owned())
        .unwrap_or_default()
}

fn validate_definition(definition: &CommandDefinition) -> Result<(), SchemaError> {
    let command = definition.command_name();
    let template = definition.endpoint_template();

    if command.trim().is_empty() {
        return Err(SchemaError::EmptyCommandName {
            endpoint: template.to_owned(),
            method: definition.method().to_string(),
        });
    }
    if !template.starts_with('/') {
        return Err(invalid_template(definition, "template must start with '/'"));
    }

    let found = placeholders(template);
    if found.iter().any(|name| name.is_empty()) {
        return Err(invalid_template(definition, "placeholder without a name"));
    }
    let declared: Vec<&str> = definition.variables().iter().map(PathVariable::name).collect();
    if found != declared {
        return Err(SchemaError::VariableMismatch {
            command: command.to_owned(),
            template: template.to_owned(),
            placeholders: found.iter().map(|name| (*name).to_owned()).collect(),
            variables: declared.iter().map(|name| (*name).to_owned()).collect(),
        });
    }

    let mut seen = Vec::with_capacity(definition.parameters().len());
    for parameter in definition.parameters() {
        if seen.contains(&parameter.name()) {
            return Err(SchemaError::DuplicateParameter {
                command: command.to_owned(),
                name: parameter.name().to_owned(),
            });
        }
        seen.push(parameter.name());
    }
    Ok(())
}

fn invalid_template(definition: &CommandDefinition, reason: &str) -> SchemaError {
    SchemaError::InvalidTemplate {
        command: definition.command_name().to_owned(),
        template: definition.endpoint_template().to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests;
