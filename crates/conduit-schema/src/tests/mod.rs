//! Properties of the bundled WebDriver command table.

use rstest::{fixture, rstest};

use crate::definition::{HttpMethod, PathVariable, placeholders};
use crate::param_type::ParamType;
use crate::registry::Registry;

#[fixture]
fn webdriver() -> Registry {
    Registry::webdriver().expect("bundled schema loads")
}

#[rstest]
fn bundled_table_is_complete(webdriver: Registry) {
    assert_eq!(webdriver.len(), 76);
}

#[rstest]
fn every_alias_resolves_to_its_owner(webdriver: Registry) {
    for definition in webdriver.commands() {
        let canonical = webdriver
            .lookup_by_name(definition.command_name())
            .expect("canonical name resolves");
        assert!(std::ptr::eq(canonical, definition));
        for alias in definition.alternative_commands() {
            let aliased = webdriver.lookup_by_name(alias).expect("alias resolves");
            assert!(
                std::ptr::eq(aliased, definition),
                "alias {alias} resolved to {}",
                aliased.command_name()
            );
        }
    }
}

#[rstest]
fn every_template_matches_its_variables(webdriver: Registry) {
    for definition in webdriver.commands() {
        let declared: Vec<&str> = definition.variables().iter().map(PathVariable::name).collect();
        assert_eq!(
            placeholders(definition.endpoint_template()),
            declared,
            "{}",
            definition.command_name()
        );
    }
}

#[rstest]
fn every_route_resolves_back_to_its_definition(webdriver: Registry) {
    for definition in webdriver.commands() {
        let routed = webdriver
            .lookup_by_endpoint(definition.endpoint_template(), definition.method())
            .expect("route resolves");
        assert!(std::ptr::eq(routed, definition));
    }
}

#[rstest]
#[case::new_session("newSession", false)]
#[case::status("status", false)]
#[case::delete_session("deleteSession", true)]
#[case::navigate("navigateTo", true)]
fn only_new_session_and_status_are_sessionless(
    webdriver: Registry,
    #[case] name: &str,
    #[case] requires_session: bool,
) {
    let definition = webdriver.lookup_by_name(name).expect("known command");
    assert_eq!(definition.requires_session(), requires_session);
}

#[rstest]
fn sessionless_commands_are_exactly_new_session_and_status(webdriver: Registry) {
    let mut sessionless: Vec<&str> = webdriver
        .commands()
        .filter(|definition| !definition.requires_session())
        .map(|definition| definition.command_name())
        .collect();
    sessionless.sort_unstable();
    assert_eq!(sessionless, vec!["newSession", "status"]);
}

#[rstest]
fn release_actions_is_a_bodyless_delete(webdriver: Registry) {
    let definition = webdriver.lookup_by_name("releaseActions").expect("known");
    assert_eq!(definition.method(), HttpMethod::Delete);
    assert!(definition.parameters().is_empty());
    assert!(definition.returns().is_none());
}

#[rstest]
fn set_timeouts_accepts_nullable_numbers(webdriver: Registry) {
    let definition = webdriver.lookup_by_name("setTimeouts").expect("known");
    let names: Vec<&str> = definition.parameters().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["implicit", "pageLoad", "script"]);
    for parameter in definition.parameters() {
        assert_eq!(parameter.param_type(), &ParamType::Number);
        assert!(!parameter.is_required());
    }
}

#[rstest]
fn execute_script_accepts_arrays_of_mixed_values(webdriver: Registry) {
    let definition = webdriver.lookup_by_name("browser/execute").expect("alias");
    assert_eq!(definition.command_name(), "executeScript");
    let args = definition.parameter("args").expect("args parameter");
    assert!(args.param_type().accepts(&serde_json::json!([1, "two", {"three": 3}, null])));
    assert_eq!(definition.returns().map(|r| r.return_type()), Some(&ParamType::Any));
}
