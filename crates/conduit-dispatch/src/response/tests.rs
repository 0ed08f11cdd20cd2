//! Unit tests for response parsing.

use conduit_schema::Registry;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::element::ELEMENT_KEY;
use crate::protocol_error::ErrorKind;

#[fixture]
fn registry() -> Registry {
    Registry::webdriver().expect("bundled schema loads")
}

fn parse(registry: &Registry, command: &str, status: u16, body: &str) -> Result<CommandResult, ResponseError> {
    let definition = registry.lookup_by_name(command).expect("known command");
    parse_response(definition, &RawResponse::new(status, body))
}

fn protocol_error(result: Result<CommandResult, ResponseError>) -> ProtocolError {
    match result {
        Err(ResponseError::Protocol(error)) => *error,
        other => panic!("expected protocol error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Success envelopes
// ---------------------------------------------------------------------------

#[rstest]
fn returns_the_declared_value(registry: Registry) {
    let body = format!(r#"{{"value":{{"{ELEMENT_KEY}":"ELEMENT_1"}}}}"#);
    let result = parse(&registry, "findElement", 200, &body).expect("success");
    assert_eq!(result.value(), Some(&json!({ELEMENT_KEY: "ELEMENT_1"})));
    assert!(result.warning().is_none());
}

#[rstest]
#[case::null(r#"{"value":null}"#)]
#[case::object(r#"{"value":{"ignored":true}}"#)]
fn void_commands_discard_the_value(registry: Registry, #[case] body: &str) {
    let result = parse(&registry, "elementClick", 200, body).expect("success");
    assert!(result.is_void());
    assert_eq!(result, CommandResult::void());
}

#[rstest]
fn shape_mismatch_is_a_warning_not_an_error(registry: Registry) {
    let result = parse(&registry, "getTitle", 200, r#"{"value":42}"#).expect("success");
    assert_eq!(result.value(), Some(&json!(42)));
    assert_eq!(
        result.warning(),
        Some(&ResponseShapeError {
            command: String::from("getTitle"),
            expected: String::from("string"),
            actual: "number",
        })
    );
}

#[rstest]
fn untyped_returns_accept_anything(registry: Registry) {
    let result = parse(&registry, "executeScript", 200, r#"{"value":[1,"two",null]}"#)
        .expect("success");
    assert_eq!(result.value(), Some(&json!([1, "two", null])));
    assert!(result.warning().is_none());
}

#[rstest]
fn success_values_with_only_an_error_key_are_data(registry: Registry) {
    let result = parse(
        &registry,
        "executeScript",
        200,
        r#"{"value":{"error":"not really"}}"#,
    )
    .expect("success");
    assert_eq!(result.value(), Some(&json!({"error": "not really"})));
}

// ---------------------------------------------------------------------------
// Error envelopes
// ---------------------------------------------------------------------------

#[rstest]
fn error_envelopes_map_to_typed_errors(registry: Registry) {
    let error = protocol_error(parse(
        &registry,
        "findElement",
        404,
        r#"{"value":{"error":"no such element","message":"Unable to locate #app","stacktrace":"frame 1"}}"#,
    ));
    assert_eq!(error.kind(), ErrorKind::NoSuchElement);
    assert_eq!(error.command(), "findElement");
    assert_eq!(error.message(), "Unable to locate #app");
    assert_eq!(error.stacktrace(), "frame 1");
    assert_eq!(error.status(), 404);
}

#[rstest]
fn error_envelopes_with_success_status_are_errors(registry: Registry) {
    let error = protocol_error(parse(
        &registry,
        "findElement",
        200,
        r#"{"value":{"error":"no such element","message":"...","stacktrace":"..."}}"#,
    ));
    assert_eq!(error.kind(), ErrorKind::NoSuchElement);
}

#[rstest]
fn unrecognised_codes_keep_the_original_string(registry: Registry) {
    let error = protocol_error(parse(
        &registry,
        "getTitle",
        500,
        r#"{"value":{"error":"chrome not reachable","message":"gone","data":{"retry":false}}}"#,
    ));
    assert_eq!(error.kind(), ErrorKind::Unrecognised);
    assert_eq!(error.error_code(), "chrome not reachable");
    assert_eq!(error.stacktrace(), "");
    assert_eq!(error.data(), Some(&json!({"retry": false})));
}

// ---------------------------------------------------------------------------
// Malformed bodies
// ---------------------------------------------------------------------------

#[rstest]
#[case::not_json(200, "<html>")]
#[case::not_an_object(200, "[1,2]")]
#[case::no_value_key(200, r#"{"sessionId":"abc"}"#)]
#[case::error_status_without_envelope(500, r#"{"value":"boom"}"#)]
#[case::empty(502, "")]
fn malformed_bodies_are_reported_with_their_status(
    registry: Registry,
    #[case] status: u16,
    #[case] body: &str,
) {
    let error = parse(&registry, "getTitle", status, body).expect_err("must fail");
    assert!(
        matches!(error, ResponseError::Malformed { status: reported, ref command, .. }
            if reported == status && command == "getTitle"),
        "{error}"
    );
}

#[test]
fn malformed_errors_convert_into_dispatch_errors() {
    let error = DispatchError::from(ResponseError::Malformed {
        command: String::from("getTitle"),
        status: 502,
        reason: String::from("body is not JSON"),
    });
    assert!(matches!(error, DispatchError::MalformedResponse { status: 502, .. }));
}
