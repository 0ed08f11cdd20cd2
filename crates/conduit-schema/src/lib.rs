//! Command schema model and registry for the conduit dispatcher.
//!
//! The `conduit-schema` crate turns protocol descriptions expressed as data
//! into an immutable [`Registry`] of typed [`CommandDefinition`]s. Each
//! definition records the endpoint template, HTTP method, parameters with
//! their decomposed [`ParamType`]s, path variables, return shape and the
//! aliases callers may use instead of the canonical name.
//!
//! # Architecture
//!
//! Loading happens in two passes. [`ProtocolSource`] deserialises the loose
//! JSON document and converts each entry into a definition, decomposing type
//! strings and supplying the implicit `sessionId` path variable. The
//! [`Registry`] then validates the whole set and builds its endpoint and name
//! indexes together; any violation fails the load without leaving a partial
//! registry behind.
//!
//! The registry holds no interior mutability, so a single instance can be
//! shared across sessions and threads behind an `Arc`.
//!
//! # Example
//!
//! ```
//! use conduit_schema::Registry;
//!
//! let registry = Registry::webdriver().expect("bundled schema loads");
//! let find = registry.lookup_by_name("findElement").expect("known command");
//! assert_eq!(find.endpoint_template(), "/session/:sessionId/element");
//! assert_eq!(find.parameters().len(), 2);
//! ```

pub mod definition;
pub mod error;
pub mod param_type;
pub mod registry;
pub mod source;

#[cfg(test)]
mod tests;

pub use self::definition::{
    CommandDefinition, HttpMethod, Parameter, PathVariable, ReturnSpec, SESSION_ID_VARIABLE,
    UnsupportedMethod, placeholders,
};
pub use self::error::{InvalidTypeSpec, SchemaError};
pub use self::param_type::{ParamType, json_kind};
pub use self::registry::Registry;
pub use self::source::ProtocolSource;
