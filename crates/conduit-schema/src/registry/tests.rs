//! Unit tests for the command registry.

use rstest::{fixture, rstest};

use super::*;
use crate::definition::{Parameter, PathVariable};
use crate::param_type::ParamType;

fn session_variable() -> PathVariable {
    PathVariable::new("sessionId", "")
}

fn navigate_to() -> CommandDefinition {
    CommandDefinition::new("/session/:sessionId/url", HttpMethod::Post, "navigateTo")
        .with_variables(vec![session_variable()])
        .with_parameters(vec![Parameter::new("url", ParamType::String, true)])
        .with_aliases(vec![String::from("browser/url")])
}

fn get_url() -> CommandDefinition {
    CommandDefinition::new("/session/:sessionId/url", HttpMethod::Get, "getUrl")
        .with_variables(vec![session_variable()])
}

fn element_rect() -> CommandDefinition {
    CommandDefinition::new(
        "/session/:sessionId/element/:elementId/rect",
        HttpMethod::Get,
        "getElementRect",
    )
    .with_variables(vec![session_variable(), PathVariable::new("elementId", "")])
    .with_aliases(vec![
        String::from("element/getSize"),
        String::from("element/getLocation"),
    ])
}

#[fixture]
fn registry() -> Registry {
    Registry::from_definitions(vec![navigate_to(), get_url(), element_rect()])
        .expect("registry builds")
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

#[rstest]
fn lookup_by_endpoint_distinguishes_methods(registry: Registry) {
    let post = registry
        .lookup_by_endpoint("/session/:sessionId/url", HttpMethod::Post)
        .expect("POST url");
    let get = registry
        .lookup_by_endpoint("/session/:sessionId/url", HttpMethod::Get)
        .expect("GET url");
    assert_eq!(post.command_name(), "navigateTo");
    assert_eq!(get.command_name(), "getUrl");
    assert!(
        registry
            .lookup_by_endpoint("/session/:sessionId/url", HttpMethod::Delete)
            .is_none()
    );
}

#[rstest]
#[case("element/getSize")]
#[case("element/getLocation")]
fn aliases_resolve_to_the_same_definition(registry: Registry, #[case] alias: &str) {
    let canonical = registry.lookup_by_name("getElementRect").expect("canonical");
    let aliased = registry.lookup_by_name(alias).expect("alias");
    assert!(std::ptr::eq(canonical, aliased));
    assert!(registry.is_alias(alias));
    assert!(!registry.is_alias("getElementRect"));
}

#[rstest]
fn aliases_of_accepts_either_name(registry: Registry) {
    let expected = ["element/getSize", "element/getLocation"];
    let via_canonical = registry.aliases_of("getElementRect").expect("canonical known");
    assert_eq!(via_canonical, expected);
    let via_alias = registry.aliases_of("element/getSize").expect("alias known");
    assert_eq!(via_alias, expected);
    assert!(registry.aliases_of("noSuchCommand").is_none());
}

#[rstest]
fn lookup_is_exact_match(registry: Registry) {
    assert!(registry.lookup_by_name("NavigateTo").is_none());
    assert!(registry.lookup_by_name(" navigateTo").is_none());
}

#[rstest]
fn commands_iterate_in_name_order(registry: Registry) {
    let names: Vec<&str> = registry.commands().map(CommandDefinition::command_name).collect();
    assert_eq!(names, vec!["getElementRect", "getUrl", "navigateTo"]);
    assert_eq!(registry.len(), 3);
    assert!(!registry.is_empty());
}

// ---------------------------------------------------------------------------
// Invariant enforcement
// ---------------------------------------------------------------------------

#[test]
fn rejects_duplicate_endpoint() {
    let clash = CommandDefinition::new("/session/:sessionId/url", HttpMethod::Post, "goTo")
        .with_variables(vec![session_variable()]);
    let err = Registry::from_definitions(vec![navigate_to(), clash]).expect_err("duplicate route");
    assert!(matches!(err, SchemaError::DuplicateEndpoint { .. }), "{err}");
}

#[rstest]
#[case::repeated_endpoint_key(r#"{
    "/status": { "GET": { "command": "status", "parameters": [] } },
    "/status": { "GET": { "command": "statusAgain", "parameters": [] } }
}"#)]
#[case::repeated_method_key(r#"{
    "/status": {
        "GET": { "command": "status", "parameters": [] },
        "GET": { "command": "statusAgain", "parameters": [] }
    }
}"#)]
fn repeated_source_keys_fail_the_load(#[case] text: &str) {
    let err = Registry::from_json_str(text).expect_err("repeated route");
    assert!(
        matches!(
            err,
            SchemaError::DuplicateEndpoint { ref endpoint, ref first, ref second, .. }
                if endpoint == "/status" && first == "status" && second == "statusAgain"
        ),
        "{err}"
    );
}

#[test]
fn rejects_duplicate_command_name() {
    let clash = CommandDefinition::new("/session/:sessionId/go", HttpMethod::Post, "navigateTo")
        .with_variables(vec![session_variable()]);
    let err = Registry::from_definitions(vec![navigate_to(), clash]).expect_err("duplicate name");
    assert!(matches!(err, SchemaError::DuplicateCommand { ref name } if name == "navigateTo"));
}

#[rstest]
#[case::alias_on_alias("browser/url")]
#[case::alias_on_canonical("navigateTo")]
fn rejects_alias_collisions(#[case] alias: &str) {
    let clash = get_url().with_aliases(vec![alias.to_owned()]);
    let err = Registry::from_definitions(vec![navigate_to(), clash]).expect_err("collision");
    assert!(matches!(err, SchemaError::AliasCollision { .. }), "{err}");
}

#[test]
fn rejects_empty_alias() {
    let bad = get_url().with_aliases(vec![String::new()]);
    let err = Registry::from_definitions(vec![bad]).expect_err("empty alias");
    assert!(matches!(err, SchemaError::EmptyAlias { .. }));
}

#[rstest]
#[case::missing_variable(vec![session_variable()])]
#[case::wrong_order(vec![PathVariable::new("elementId", ""), session_variable()])]
#[case::extra_variable(vec![
    session_variable(),
    PathVariable::new("elementId", ""),
    PathVariable::new("name", ""),
])]
fn rejects_variable_mismatch(#[case] variables: Vec<PathVariable>) {
    let bad = element_rect().with_variables(variables);
    let err = Registry::from_definitions(vec![bad]).expect_err("mismatch");
    assert!(matches!(err, SchemaError::VariableMismatch { .. }), "{err}");
}

#[test]
fn rejects_relative_template() {
    let bad = CommandDefinition::new("status", HttpMethod::Get, "status");
    let err = Registry::from_definitions(vec![bad]).expect_err("relative template");
    assert!(matches!(err, SchemaError::InvalidTemplate { .. }));
}

#[test]
fn rejects_duplicate_parameter() {
    let bad = navigate_to().with_parameters(vec![
        Parameter::new("url", ParamType::String, true),
        Parameter::new("url", ParamType::String, false),
    ]);
    let err = Registry::from_definitions(vec![bad]).expect_err("duplicate parameter");
    assert!(matches!(err, SchemaError::DuplicateParameter { .. }));
}

#[test]
fn load_is_all_or_nothing() {
    let text = r#"{
        "/status": { "GET": { "command": "status", "parameters": [] } },
        "/session/:sessionId/element/:elementId/click": {
            "POST": { "command": "elementClick", "parameters": [] }
        }
    }"#;
    let err = Registry::from_json_str(text).expect_err("undeclared elementId");
    assert!(
        matches!(err, SchemaError::VariableMismatch { ref command, .. } if command == "elementClick")
    );
}
