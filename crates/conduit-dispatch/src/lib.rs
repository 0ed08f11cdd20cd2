//! Schema-driven command dispatch for WebDriver-style remote ends.
//!
//! The `conduit-dispatch` crate executes named commands against a remote
//! end described by a [`conduit_schema::Registry`]. A caller hands a command
//! name (canonical or alias) and a JSON argument object to a
//! [`SessionDispatcher`]; the dispatcher resolves the definition, validates
//! and routes the arguments into a [`RequestDescriptor`], sends it through an
//! injected [`Transport`], and parses the reply into a [`CommandResult`] or a
//! typed [`DispatchError`].
//!
//! # Architecture
//!
//! Each dispatcher owns exactly one session. Commands travel through a FIFO
//! queue to a worker thread that holds the transport, so requests for one
//! session never overlap and reach the remote end in issuance order. The
//! caller enforces the effective deadline (session script or page-load
//! timeout plus grace, the implicit wait plus grace for element lookups
//! when that is longer, or the configured default) and observes a
//! [`CancelHandle`] that can end the session from any thread.
//!
//! Multiremote setups create one dispatcher per session; all of them share a
//! single immutable registry behind an `Arc`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use conduit_dispatch::{
//!     CallContext, DispatcherSettings, RawResponse, RequestDescriptor, SessionDispatcher,
//!     SessionState, Transport, TransportError,
//! };
//! use conduit_schema::Registry;
//! use serde_json::json;
//!
//! struct Loopback;
//!
//! impl Transport for Loopback {
//!     fn send(
//!         &self,
//!         request: &RequestDescriptor,
//!         _call: &CallContext,
//!     ) -> Result<RawResponse, TransportError> {
//!         let body = match request.command() {
//!             "newSession" => r#"{"value":{"sessionId":"s1","capabilities":{}}}"#,
//!             _ => r#"{"value":"https://example.com/"}"#,
//!         };
//!         Ok(RawResponse::new(200, body))
//!     }
//! }
//!
//! let registry = Arc::new(Registry::webdriver().expect("bundled schema loads"));
//! let mut session = SessionDispatcher::new(registry, Loopback, DispatcherSettings::default())
//!     .expect("worker starts");
//! session
//!     .dispatch("newSession", &json!({"capabilities": {}}))
//!     .expect("session starts");
//! assert_eq!(session.state(), SessionState::Active);
//!
//! let url = session.dispatch("getUrl", &json!(null)).expect("url read");
//! assert_eq!(url.value(), Some(&json!("https://example.com/")));
//! session.shutdown().expect("worker stops");
//! ```

pub mod dispatcher;
pub mod element;
pub mod error;
pub mod protocol_error;
pub mod request;
pub mod resolver;
pub mod response;
pub mod retry;
pub mod session;
pub mod settings;
pub mod transport;

#[cfg(test)]
mod tests;

pub use self::dispatcher::{CancelHandle, SessionDispatcher};
pub use self::element::{
    ELEMENT_KEY, SHADOW_ROOT_KEY, element_id, element_ids, element_reference, shadow_root_id,
    shadow_root_reference,
};
pub use self::error::{BuildError, DispatchError, UnknownCommand};
pub use self::protocol_error::{ErrorKind, ProtocolError};
pub use self::request::{RequestDescriptor, build_request};
pub use self::resolver::CommandResolver;
pub use self::response::{CommandResult, ResponseError, ResponseShapeError, parse_response};
pub use self::retry::RetryPolicy;
pub use self::session::{
    DEFAULT_IMPLICIT_TIMEOUT_MS, DEFAULT_PAGE_LOAD_TIMEOUT_MS, DEFAULT_SCRIPT_TIMEOUT_MS,
    SessionContext, SessionState, Timeouts,
};
pub use self::settings::DispatcherSettings;
pub use self::transport::{CallContext, CancelToken, RawResponse, Transport, TransportError};
