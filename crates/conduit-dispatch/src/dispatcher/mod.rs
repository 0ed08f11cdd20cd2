//! Session dispatcher: one session's ordered command pipeline.
//!
//! A [`SessionDispatcher`] drives resolve, build, transport and parse for
//! every command issued against one session, and owns that session's
//! [`SessionContext`]. The transport lives on a dedicated worker thread fed
//! by a FIFO channel, so at most one request is ever in flight and commands
//! reach the remote end in issuance order.
//!
//! The caller blocks until its command settles. While waiting it polls the
//! effective deadline and the session's cancellation flag; when either fires
//! it trips the call's [`CancelToken`] and returns straight away. A command
//! issued afterwards queues behind the abandoned call rather than overlapping
//! it.
//!
//! Independent sessions use independent dispatchers sharing one
//! `Arc<Registry>`.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use conduit_schema::{CommandDefinition, Registry};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::DispatchError;
use crate::request::{RequestDescriptor, build_request};
use crate::resolver::CommandResolver;
use crate::response::{CommandResult, parse_response};
use crate::retry::RetryPolicy;
use crate::session::{SessionContext, SessionState};
use crate::settings::DispatcherSettings;
use crate::transport::{CallContext, CancelToken, RawResponse, Transport, TransportError};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// How often a waiting caller checks its deadline and the cancel flag.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

const NEW_SESSION: &str = "newSession";
const DELETE_SESSION: &str = "deleteSession";
const SET_TIMEOUTS: &str = "setTimeouts";
const GET_TIMEOUTS: &str = "getTimeouts";

/// Commands bounded by the session script timeout.
const SCRIPT_COMMANDS: &[&str] = &["executeScript", "executeAsyncScript"];

/// Commands bounded by the session page-load timeout.
const NAVIGATION_COMMANDS: &[&str] = &["navigateTo", "back", "forward", "refresh"];

/// Commands that wait up to the session implicit timeout for an element.
const LOCATOR_COMMANDS: &[&str] = &[
    "findElement",
    "findElements",
    "findElementFromElement",
    "findElementsFromElement",
    "findElementFromShadowRoot",
    "findElementsFromShadowRoot",
];

type Reply = Result<RawResponse, TransportError>;

struct Job {
    request: RequestDescriptor,
    call: CallContext,
    reply: SyncSender<Reply>,
}

/// Cloneable handle that cancels a dispatcher's session from any thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancelToken,
}

impl CancelHandle {
    /// Cancels the session. A pending dispatch settles with
    /// [`DispatchError::Cancelled`] and the session becomes
    /// [`SessionState::Terminated`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the session has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Executes commands for one session, strictly in issuance order.
#[derive(Debug)]
pub struct SessionDispatcher {
    registry: Arc<Registry>,
    settings: DispatcherSettings,
    state: SessionState,
    session: Option<SessionContext>,
    cancel: CancelToken,
    jobs: Sender<Job>,
    worker: JoinHandle<()>,
}

impl SessionDispatcher {
    /// Creates a dispatcher and starts its worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WorkerSpawn`] if the worker thread cannot be
    /// started.
    pub fn new<T>(
        registry: Arc<Registry>,
        transport: T,
        settings: DispatcherSettings,
    ) -> Result<Self, DispatchError>
    where
        T: Transport + Send + 'static,
    {
        let (jobs, queue) = mpsc::channel::<Job>();
        let retry = settings.retry();
        let worker = thread::Builder::new()
            .name(String::from("conduit-dispatch"))
            .spawn(move || run_worker(&transport, &queue, retry))
            .map_err(|source| DispatchError::WorkerSpawn {
                source: Arc::new(source),
            })?;
        Ok(Self {
            registry,
            settings,
            state: SessionState::Unstarted,
            session: None,
            cancel: CancelToken::new(),
            jobs,
            worker,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Context of the active session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    /// Registry used to resolve commands.
    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Settings in force.
    #[must_use]
    pub const fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    /// Returns a handle that cancels this session.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            token: self.cancel.clone(),
        }
    }

    /// Ends the session locally without contacting the remote end.
    pub fn terminate(&mut self) {
        self.end_session("terminated by caller");
    }

    /// Dispatches one command by canonical name or alias.
    ///
    /// `args` must be a JSON object or `null`.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] when the name is unknown, the session
    /// state forbids the command, the arguments fail validation, the
    /// transport fails or times out, the session is cancelled, or the remote
    /// end reports an error or replies with a malformed body.
    pub fn dispatch(&mut self, name: &str, args: &Value) -> Result<CommandResult, DispatchError> {
        let registry = Arc::clone(&self.registry);
        let definition = CommandResolver::new(&registry).resolve(name)?;
        self.admit(definition)?;
        let request = build_request(definition, self.session.as_ref(), args)?;
        let timeout = self.deadline_for(definition);

        debug!(
            target: DISPATCH_TARGET,
            command = definition.command_name(),
            requested = name,
            method = %request.method(),
            url = request.url(),
            timeout_ms = duration_ms(timeout),
            "dispatching command"
        );

        let raw = match self.execute(&request, timeout) {
            Ok(raw) => raw,
            Err(error) => {
                self.after_failure(&error);
                return Err(error);
            }
        };
        match parse_response(definition, &raw) {
            Ok(result) => {
                self.after_success(definition, &request, &raw, &result)?;
                Ok(result)
            }
            Err(parse_error) => {
                let error = DispatchError::from(parse_error);
                self.after_failure(&error);
                Err(error)
            }
        }
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// Blocks until any request still running on the worker returns.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::WorkerStopped`] if the worker panicked.
    pub fn shutdown(self) -> Result<(), DispatchError> {
        let Self { jobs, worker, .. } = self;
        drop(jobs);
        worker.join().map_err(|_| DispatchError::WorkerStopped {
            reason: String::from("worker thread panicked"),
        })
    }

    fn admit(&mut self, definition: &CommandDefinition) -> Result<(), DispatchError> {
        let command = definition.command_name();
        if self.cancel.is_cancelled() {
            self.end_session("session cancelled");
        }
        match self.state {
            SessionState::Terminated => Err(DispatchError::SessionTerminated {
                command: command.to_owned(),
            }),
            SessionState::Unstarted if definition.requires_session() => {
                Err(DispatchError::SessionNotStarted {
                    command: command.to_owned(),
                })
            }
            SessionState::Active if command == NEW_SESSION => {
                Err(DispatchError::SessionAlreadyStarted {
                    session_id: self
                        .session
                        .as_ref()
                        .map(|session| session.session_id().to_owned())
                        .unwrap_or_default(),
                })
            }
            _ => Ok(()),
        }
    }

    fn deadline_for(&self, definition: &CommandDefinition) -> Duration {
        let fallback = self.settings.default_timeout();
        let Some(session) = &self.session else {
            return fallback;
        };
        let command = definition.command_name();
        let grace = self.settings.timeout_grace();
        if LOCATOR_COMMANDS.contains(&command) {
            // The implicit wait only ever extends the default deadline.
            return session
                .timeouts()
                .implicit()
                .map_or(fallback, |wait| fallback.max(wait.saturating_add(grace)));
        }
        let limit = if SCRIPT_COMMANDS.contains(&command) {
            session.timeouts().script()
        } else if NAVIGATION_COMMANDS.contains(&command) {
            session.timeouts().page_load()
        } else {
            None
        };
        limit.map_or(fallback, |bound| bound.saturating_add(grace))
    }

    fn execute(
        &self,
        request: &RequestDescriptor,
        timeout: Duration,
    ) -> Result<RawResponse, DispatchError> {
        let command = request.command();
        let call_token = CancelToken::new();
        let (reply, response) = mpsc::sync_channel(1);
        let job = Job {
            request: request.clone(),
            call: CallContext::new(timeout, call_token.clone()),
            reply,
        };
        self.jobs
            .send(job)
            .map_err(|_| DispatchError::WorkerStopped {
                reason: String::from("job queue closed"),
            })?;

        let deadline = Instant::now().checked_add(timeout);
        loop {
            if self.cancel.is_cancelled() {
                call_token.cancel();
                warn!(target: DISPATCH_TARGET, command, "command cancelled");
                return Err(DispatchError::Cancelled {
                    command: command.to_owned(),
                });
            }
            let wait = match deadline {
                Some(until) => {
                    let remaining = until.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        call_token.cancel();
                        warn!(
                            target: DISPATCH_TARGET,
                            command,
                            timeout_ms = duration_ms(timeout),
                            "command timed out"
                        );
                        return Err(DispatchError::Timeout {
                            command: command.to_owned(),
                            timeout,
                        });
                    }
                    remaining.min(POLL_INTERVAL)
                }
                None => POLL_INTERVAL,
            };
            match response.recv_timeout(wait) {
                Ok(Ok(raw)) => return Ok(raw),
                Ok(Err(error)) => return Err(transport_failure(command, timeout, error)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(DispatchError::WorkerStopped {
                        reason: String::from("worker dropped the reply channel"),
                    });
                }
            }
        }
    }

    fn after_success(
        &mut self,
        definition: &CommandDefinition,
        request: &RequestDescriptor,
        raw: &RawResponse,
        result: &CommandResult,
    ) -> Result<(), DispatchError> {
        match definition.command_name() {
            NEW_SESSION => {
                let context = result
                    .value()
                    .and_then(SessionContext::from_new_session)
                    .ok_or_else(|| DispatchError::MalformedResponse {
                        command: String::from(NEW_SESSION),
                        status: raw.status(),
                        reason: String::from("response carries no string 'sessionId'"),
                    })?;
                info!(
                    target: DISPATCH_TARGET,
                    session_id = context.session_id(),
                    "session started"
                );
                self.session = Some(context);
                self.state = SessionState::Active;
            }
            DELETE_SESSION => self.end_session("session deleted"),
            SET_TIMEOUTS => {
                if let Some(session) = &mut self.session {
                    session.update_timeouts(&Value::Object(request.parameters().clone()));
                }
            }
            GET_TIMEOUTS => {
                if let (Some(session), Some(value)) = (&mut self.session, result.value()) {
                    session.update_timeouts(value);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn after_failure(&mut self, error: &DispatchError) {
        match error {
            DispatchError::Protocol(protocol) if protocol.is_fatal() => {
                self.end_session("fatal protocol error");
            }
            DispatchError::Cancelled { .. } => self.end_session("session cancelled"),
            DispatchError::WorkerStopped { .. } => self.end_session("dispatcher worker lost"),
            DispatchError::Transport { .. } if self.settings.terminate_on_transport_error() => {
                self.end_session("transport failure");
            }
            _ => {}
        }
    }

    fn end_session(&mut self, reason: &str) {
        if self.state == SessionState::Terminated {
            return;
        }
        info!(
            target: DISPATCH_TARGET,
            session_id = self.session.as_ref().map(SessionContext::session_id),
            reason,
            "session terminated"
        );
        self.state = SessionState::Terminated;
        self.session = None;
    }
}

fn run_worker<T: Transport>(transport: &T, queue: &Receiver<Job>, retry: RetryPolicy) {
    for job in queue {
        let Job {
            request,
            call,
            reply,
        } = job;
        let started = Instant::now();
        let outcome = retry.run(request.method(), call.cancel_token(), |attempt| {
            transport.send(&request, &call.for_attempt(attempt))
        });
        debug!(
            target: DISPATCH_TARGET,
            command = request.command(),
            status = outcome.as_ref().ok().map(RawResponse::status),
            elapsed_ms = duration_ms(started.elapsed()),
            "transport round trip finished"
        );
        if reply.send(outcome).is_err() {
            debug!(
                target: DISPATCH_TARGET,
                command = request.command(),
                "caller stopped waiting; response discarded"
            );
        }
    }
}

fn transport_failure(command: &str, timeout: Duration, error: TransportError) -> DispatchError {
    match error {
        TransportError::TimedOut => DispatchError::Timeout {
            command: command.to_owned(),
            timeout,
        },
        TransportError::Cancelled => DispatchError::Cancelled {
            command: command.to_owned(),
        },
        other => {
            warn!(target: DISPATCH_TARGET, command, error = %other, "transport failure");
            DispatchError::Transport {
                command: command.to_owned(),
                source: other,
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
