//! Closed set of parameter and return types.
//!
//! Schema data spells types as loose strings such as `string`, `Object[]` or
//! `(number|object|null)`. [`ParamType::parse`] decomposes them once at load
//! time so request building never has to interpret type strings.

use std::fmt;

use serde_json::Value;

use crate::error::InvalidTypeSpec;

/// A decomposed parameter or return type.
///
/// # Example
///
/// ```
/// use conduit_schema::ParamType;
/// use serde_json::json;
///
/// let ty = ParamType::parse("(number|null)").expect("valid type");
/// assert!(ty.accepts(&json!(42)));
/// assert!(ty.accepts(&json!(null)));
/// assert!(!ty.accepts(&json!("42")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Accepts any value (`*`).
    Any,
    /// JSON `null`.
    Null,
    /// An omitted value; serialised as `null` on the JSON wire.
    Undefined,
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A JSON object. Arrays are accepted too, as they are objects on the
    /// platform the schema was written for.
    Object,
    /// An array whose elements all satisfy the inner type.
    Array(Box<ParamType>),
    /// Any one of the listed alternatives.
    Union(Vec<ParamType>),
}

impl ParamType {
    /// Parses a schema type string.
    ///
    /// Primitive names are matched case-insensitively. A trailing `[]` wraps
    /// the preceding type in [`ParamType::Array`]; parentheses group a
    /// `|`-separated union.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTypeSpec`] for empty strings, unknown primitives,
    /// unbalanced or nested parentheses and empty union members.
    pub fn parse(spec: &str) -> Result<Self, InvalidTypeSpec> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(InvalidTypeSpec::new(spec, "type must not be empty"));
        }
        if let Some(element) = trimmed.strip_suffix("[]") {
            let inner = Self::parse(element).map_err(|err| InvalidTypeSpec::new(spec, err.reason))?;
            return Ok(Self::Array(Box::new(inner)));
        }
        if let Some(body) = trimmed.strip_prefix('(') {
            let Some(members) = body.strip_suffix(')') else {
                return Err(InvalidTypeSpec::new(spec, "unbalanced parentheses"));
            };
            return Self::parse_union(spec, members);
        }
        if trimmed.contains(['(', ')']) {
            return Err(InvalidTypeSpec::new(spec, "unbalanced parentheses"));
        }
        if trimmed.contains('|') {
            return Self::parse_union(spec, trimmed);
        }
        Self::parse_primitive(spec, trimmed)
    }

    fn parse_union(spec: &str, members: &str) -> Result<Self, InvalidTypeSpec> {
        if members.contains(['(', ')']) {
            return Err(InvalidTypeSpec::new(spec, "nested unions are not supported"));
        }
        let mut alternatives = Vec::new();
        for member in members.split('|') {
            if member.trim().is_empty() {
                return Err(InvalidTypeSpec::new(spec, "union has an empty member"));
            }
            let parsed =
                Self::parse(member).map_err(|err| InvalidTypeSpec::new(spec, err.reason))?;
            alternatives.push(parsed);
        }
        if alternatives.len() == 1
            && let Some(only) = alternatives.pop()
        {
            return Ok(only);
        }
        Ok(Self::Union(alternatives))
    }

    fn parse_primitive(spec: &str, name: &str) -> Result<Self, InvalidTypeSpec> {
        match name.to_ascii_lowercase().as_str() {
            "*" | "any" => Ok(Self::Any),
            "null" => Ok(Self::Null),
            "undefined" => Ok(Self::Undefined),
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array(Box::new(Self::Any))),
            other => Err(InvalidTypeSpec::new(
                spec,
                format!("unknown primitive type '{other}'"),
            )),
        }
    }

    /// Returns `true` when `value` has a runtime shape this type admits.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Null | Self::Undefined => value.is_null(),
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object() || value.is_array(),
            Self::Array(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| inner.accepts(item))),
            Self::Union(alternatives) => alternatives.iter().any(|alt| alt.accepts(value)),
        }
    }

    /// Returns `true` when a JSON `null` satisfies this type.
    #[must_use]
    pub fn admits_null(&self) -> bool {
        self.accepts(&Value::Null)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Null => f.write_str("null"),
            Self::Undefined => f.write_str("undefined"),
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Object => f.write_str("object"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Union(alternatives) => {
                f.write_str("(")?;
                for (index, alt) in alternatives.iter().enumerate() {
                    if index > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{alt}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Names the JSON shape of a value for diagnostics.
#[must_use]
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
