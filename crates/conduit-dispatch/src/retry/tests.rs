//! Unit tests for the retry policy.

use std::cell::Cell;
use std::time::Duration;

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn policy() -> RetryPolicy {
    RetryPolicy::new(2, Duration::ZERO)
}

fn ok() -> Result<RawResponse, TransportError> {
    Ok(RawResponse::new(200, r#"{"value":null}"#))
}

#[rstest]
fn connect_failures_on_get_are_retried(policy: RetryPolicy) {
    let calls = Cell::new(0);
    let outcome = policy.run(HttpMethod::Get, &CancelToken::new(), |attempt| {
        calls.set(attempt);
        if attempt < 3 {
            Err(TransportError::connect("refused"))
        } else {
            ok()
        }
    });
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(calls.get(), 3);
}

#[rstest]
fn the_budget_bounds_attempts(policy: RetryPolicy) {
    let calls = Cell::new(0);
    let outcome = policy.run(HttpMethod::Get, &CancelToken::new(), |attempt| {
        calls.set(attempt);
        Err(TransportError::connect("refused"))
    });
    assert_eq!(outcome, Err(TransportError::connect("refused")));
    assert_eq!(calls.get(), 3);
}

#[rstest]
#[case::post_connect(HttpMethod::Post, TransportError::connect("refused"))]
#[case::delete_connect(HttpMethod::Delete, TransportError::connect("refused"))]
#[case::get_after_send(HttpMethod::Get, TransportError::request("reset by peer"))]
#[case::get_timed_out(HttpMethod::Get, TransportError::TimedOut)]
fn other_failures_are_returned_immediately(
    policy: RetryPolicy,
    #[case] method: HttpMethod,
    #[case] error: TransportError,
) {
    let calls = Cell::new(0);
    let outcome = policy.run(method, &CancelToken::new(), |attempt| {
        calls.set(attempt);
        Err(error.clone())
    });
    assert_eq!(outcome, Err(error));
    assert_eq!(calls.get(), 1);
}

#[rstest]
fn cancellation_stops_retries(policy: RetryPolicy) {
    let cancel = CancelToken::new();
    let calls = Cell::new(0);
    let outcome = policy.run(HttpMethod::Get, &cancel, |attempt| {
        calls.set(attempt);
        cancel.cancel();
        Err(TransportError::connect("refused"))
    });
    assert_eq!(outcome, Err(TransportError::Cancelled));
    assert_eq!(calls.get(), 1);
}

#[test]
fn none_never_retries() {
    let policy = RetryPolicy::none();
    assert!(!policy.permits(HttpMethod::Get, &TransportError::connect("refused"), 1));
}
