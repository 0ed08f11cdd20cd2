//! Command name resolution.
//!
//! Resolution is an exact-match lookup in the registry's name index, where
//! canonical names and aliases share one namespace. Resolving an alias yields
//! the same [`CommandDefinition`] reference as resolving the canonical name.

use conduit_schema::{CommandDefinition, Registry};

use crate::error::UnknownCommand;

/// Maps command names and aliases to their definitions.
#[derive(Debug, Clone, Copy)]
pub struct CommandResolver<'r> {
    registry: &'r Registry,
}

impl<'r> CommandResolver<'r> {
    /// Creates a resolver over a registry.
    #[must_use]
    pub const fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Resolves a canonical name or alias.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCommand`] when the name matches nothing.
    pub fn resolve(&self, name: &str) -> Result<&'r CommandDefinition, UnknownCommand> {
        self.registry
            .lookup_by_name(name)
            .ok_or_else(|| UnknownCommand {
                name: name.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests;
