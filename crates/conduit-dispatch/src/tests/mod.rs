//! Crate-level test support and behaviour tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use conduit_schema::Registry;
use mockall::mock;
use serde_json::{Value, json};

use crate::dispatcher::SessionDispatcher;
use crate::request::RequestDescriptor;
use crate::retry::RetryPolicy;
use crate::settings::DispatcherSettings;
use crate::transport::{CallContext, RawResponse, Transport, TransportError};


mock! {
    pub Remote {}
    impl Transport for Remote {
        fn send(
            &self,
            request: &RequestDescriptor,
            call: &CallContext,
        ) -> Result<RawResponse, TransportError>;
    }
}

type Reply = Result<RawResponse, TransportError>;

/// Success envelope around `value`.
pub(crate) fn envelope(value: &Value) -> Reply {
    Ok(RawResponse::new(200, json!({ "value": value }).to_string()))
}

/// Error envelope with the given status and code.
pub(crate) fn error_envelope(status: u16, code: &str, message: &str) -> Reply {
    let body = json!({
        "value": {"error": code, "message": message, "stacktrace": "remote frames"}
    });
    Ok(RawResponse::new(status, body.to_string()))
}

/// `newSession` reply for session `abc` with the given timeouts.
pub(crate) fn new_session_reply(timeouts: &Value) -> Reply {
    envelope(&json!({
        "sessionId": "abc",
        "capabilities": {"browserName": "firefox", "timeouts": timeouts}
    }))
}

pub(crate) fn webdriver_registry() -> Arc<Registry> {
    Arc::new(Registry::webdriver().expect("bundled schema loads"))
}

/// Settings without retries so tests observe every failure directly.
pub(crate) fn test_settings() -> DispatcherSettings {
    DispatcherSettings::default().with_retry(RetryPolicy::none())
}

pub(crate) fn dispatcher_with<T>(transport: T, settings: DispatcherSettings) -> SessionDispatcher
where
    T: Transport + Send + 'static,
{
    SessionDispatcher::new(webdriver_registry(), transport, settings).expect("dispatcher starts")
}

#[derive(Default)]
struct Script {
    replies: HashMap<String, VecDeque<Reply>>,
    delays: HashMap<String, Duration>,
    hang_until_cancelled: HashSet<String>,
    requests: Vec<RequestDescriptor>,
    events: Vec<String>,
}

/// Transport double replaying scripted replies per command.
///
/// Commands without a scripted reply answer `{"value": null}`. Clones share
/// one script, so tests keep a handle after moving a clone into the
/// dispatcher.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("script lock")
    }

    pub(crate) fn reply(&self, command: &str, reply: Reply) -> &Self {
        self.script()
            .replies
            .entry(command.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn delay(&self, command: &str, delay: Duration) -> &Self {
        self.script().delays.insert(command.to_owned(), delay);
        self
    }

    pub(crate) fn hang_until_cancelled(&self, command: &str) -> &Self {
        self.script()
            .hang_until_cancelled
            .insert(command.to_owned());
        self
    }

    pub(crate) fn requests(&self) -> Vec<RequestDescriptor> {
        self.script().requests.clone()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.command().to_owned())
            .collect()
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.script().events.clone()
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &RequestDescriptor, call: &CallContext) -> Reply {
        let command = request.command().to_owned();
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let (reply, delay, hang) = {
            let mut script = self.script();
            script.requests.push(request.clone());
            script.events.push(format!("start {command}"));
            let reply = script
                .replies
                .get_mut(&command)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| envelope(&Value::Null));
            let delay = script.delays.get(&command).copied();
            (reply, delay, script.hang_until_cancelled.contains(&command))
        };

        if let Some(pause) = delay {
            thread::sleep(pause);
        }
        let outcome = if hang {
            while !call.is_cancelled() {
                thread::sleep(Duration::from_millis(1));
            }
            Err(TransportError::Cancelled)
        } else {
            reply
        };

        self.script().events.push(format!("end {command}"));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
