//! Unit tests for transport plumbing.

use std::time::Duration;

use rstest::rstest;

use super::*;

#[rstest]
#[case(200, true)]
#[case(204, true)]
#[case(299, true)]
#[case(301, false)]
#[case(404, false)]
#[case(500, false)]
fn success_covers_the_2xx_range(#[case] status: u16, #[case] expected: bool) {
    assert_eq!(RawResponse::new(status, "{}").is_success(), expected);
}

#[test]
fn cancel_tokens_share_state_across_clones() {
    let token = CancelToken::new();
    let observer = token.clone();
    assert!(!observer.is_cancelled());

    token.cancel();

    assert!(observer.is_cancelled());
}

#[test]
fn later_attempts_keep_the_deadline_and_token() {
    let token = CancelToken::new();
    let first = CallContext::new(Duration::from_secs(2), token.clone());
    let retry = first.for_attempt(3);

    token.cancel();

    assert_eq!(first.attempt(), 1);
    assert_eq!(retry.attempt(), 3);
    assert_eq!(retry.timeout(), Duration::from_secs(2));
    assert!(retry.is_cancelled());
}

#[rstest]
#[case(TransportError::connect("refused"), true)]
#[case(TransportError::request("reset"), false)]
#[case(TransportError::TimedOut, false)]
#[case(TransportError::Cancelled, false)]
fn only_connect_failures_precede_the_request(
    #[case] error: TransportError,
    #[case] expected: bool,
) {
    assert_eq!(error.is_pre_request(), expected);
}

#[test]
fn smart_pointers_forward_to_the_inner_transport() {
    struct Fixed;

    impl Transport for Fixed {
        fn send(
            &self,
            request: &RequestDescriptor,
            _call: &CallContext,
        ) -> Result<RawResponse, TransportError> {
            Ok(RawResponse::new(200, request.url().to_owned()))
        }
    }

    let registry = conduit_schema::Registry::webdriver().expect("bundled schema loads");
    let definition = registry.lookup_by_name("status").expect("known command");
    let request = crate::request::build_request(definition, None, &serde_json::Value::Null)
        .expect("status builds");
    let call = CallContext::new(Duration::from_secs(1), CancelToken::new());

    let boxed: Box<dyn Transport> = Box::new(Fixed);
    let shared = Arc::new(Fixed);

    assert_eq!(boxed.send(&request, &call).map(|raw| raw.body().to_owned()), Ok(String::from("/status")));
    assert_eq!(shared.send(&request, &call).map(|raw| raw.body().to_owned()), Ok(String::from("/status")));
}
