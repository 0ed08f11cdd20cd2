//! Web element and shadow root references.
//!
//! Commands that locate elements return objects keyed by fixed identifiers.
//! These helpers extract the reference so it can be passed as the
//! `elementId` or `shadowId` path variable of a later command, and build the
//! reference objects scripts expect as arguments.

use serde_json::{Map, Value};

/// Key identifying a web element reference.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Key identifying a shadow root reference.
pub const SHADOW_ROOT_KEY: &str = "shadow-6066-11e4-a52e-4f735466cecf";

/// Returns the element id carried by a reference object.
#[must_use]
pub fn element_id(value: &Value) -> Option<&str> {
    reference(value, ELEMENT_KEY)
}

/// Returns the shadow root id carried by a reference object.
#[must_use]
pub fn shadow_root_id(value: &Value) -> Option<&str> {
    reference(value, SHADOW_ROOT_KEY)
}

/// Returns the element ids of an array of references, skipping entries that
/// are not element references.
#[must_use]
pub fn element_ids(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(element_id).collect())
        .unwrap_or_default()
}

/// Builds the reference object for an element id.
#[must_use]
pub fn element_reference(id: &str) -> Value {
    let mut fields = Map::new();
    fields.insert(ELEMENT_KEY.to_owned(), Value::String(id.to_owned()));
    Value::Object(fields)
}

/// Builds the reference object for a shadow root id.
#[must_use]
pub fn shadow_root_reference(id: &str) -> Value {
    let mut fields = Map::new();
    fields.insert(SHADOW_ROOT_KEY.to_owned(), Value::String(id.to_owned()));
    Value::Object(fields)
}

fn reference<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str)
}
