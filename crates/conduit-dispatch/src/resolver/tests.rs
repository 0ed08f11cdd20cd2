//! Unit tests for command resolution.

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn registry() -> Registry {
    Registry::webdriver().expect("bundled schema loads")
}

#[rstest]
#[case("getElementRect", "element/getSize")]
#[case("getElementRect", "element/getLocation")]
#[case("navigateTo", "browser/url")]
#[case("executeScript", "browser/execute")]
fn alias_and_canonical_name_resolve_identically(
    registry: Registry,
    #[case] canonical: &str,
    #[case] alias: &str,
) {
    let resolver = CommandResolver::new(&registry);
    let by_name = resolver.resolve(canonical).expect("canonical resolves");
    let by_alias = resolver.resolve(alias).expect("alias resolves");
    assert!(std::ptr::eq(by_name, by_alias));
    assert_eq!(by_alias.command_name(), canonical);
}

#[rstest]
fn every_alias_in_the_bundled_table_resolves(registry: Registry) {
    let resolver = CommandResolver::new(&registry);
    for definition in registry.commands() {
        for alias in definition.alternative_commands() {
            let resolved = resolver.resolve(alias).expect("alias resolves");
            assert!(std::ptr::eq(resolved, definition), "alias {alias}");
        }
    }
}

#[rstest]
#[case::unknown("fly")]
#[case::wrong_case("newsession")]
#[case::padded("newSession ")]
#[case::empty("")]
fn unknown_names_fail(registry: Registry, #[case] name: &str) {
    let error = CommandResolver::new(&registry)
        .resolve(name)
        .expect_err("resolution must fail");
    assert_eq!(error.name, name);
}
