//! Per-session state owned by one dispatcher.

use std::time::Duration;

use serde_json::{Map, Value};

/// Default script timeout defined by the protocol.
pub const DEFAULT_SCRIPT_TIMEOUT_MS: u64 = 30_000;
/// Default page-load timeout defined by the protocol.
pub const DEFAULT_PAGE_LOAD_TIMEOUT_MS: u64 = 300_000;
/// Default implicit wait defined by the protocol.
pub const DEFAULT_IMPLICIT_TIMEOUT_MS: u64 = 0;

/// Lifecycle of a dispatcher's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been created yet.
    Unstarted,
    /// A session is open and accepts commands.
    Active,
    /// The session has ended; no further commands are accepted.
    Terminated,
}

/// Session timeouts in milliseconds; `None` means the remote end applies no
/// limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    script: Option<u64>,
    page_load: Option<u64>,
    implicit: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            script: Some(DEFAULT_SCRIPT_TIMEOUT_MS),
            page_load: Some(DEFAULT_PAGE_LOAD_TIMEOUT_MS),
            implicit: Some(DEFAULT_IMPLICIT_TIMEOUT_MS),
        }
    }
}

impl Timeouts {
    /// Creates timeouts from explicit values.
    #[must_use]
    pub const fn new(script: Option<u64>, page_load: Option<u64>, implicit: Option<u64>) -> Self {
        Self {
            script,
            page_load,
            implicit,
        }
    }

    /// Script evaluation timeout.
    #[must_use]
    pub fn script(&self) -> Option<Duration> {
        self.script.map(Duration::from_millis)
    }

    /// Page-load timeout.
    #[must_use]
    pub fn page_load(&self) -> Option<Duration> {
        self.page_load.map(Duration::from_millis)
    }

    /// Implicit element-location wait.
    #[must_use]
    pub fn implicit(&self) -> Option<Duration> {
        self.implicit.map(Duration::from_millis)
    }

    /// Merges a protocol timeouts object into these values.
    ///
    /// Keys `script`, `pageLoad` and `implicit` holding a non-negative
    /// integer set the value, `null` clears it and absent keys or other JSON
    /// kinds leave it untouched.
    pub fn merge(&mut self, value: &Value) {
        let Value::Object(fields) = value else {
            return;
        };
        merge_field(&mut self.script, fields, "script");
        merge_field(&mut self.page_load, fields, "pageLoad");
        merge_field(&mut self.implicit, fields, "implicit");
    }
}

fn merge_field(slot: &mut Option<u64>, fields: &Map<String, Value>, key: &str) {
    match fields.get(key) {
        Some(Value::Null) => *slot = None,
        Some(Value::Number(number)) => {
            if let Some(millis) = number.as_u64() {
                *slot = Some(millis);
            }
        }
        _ => {}
    }
}

/// State of one open session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    session_id: String,
    capabilities: Map<String, Value>,
    timeouts: Timeouts,
}

impl SessionContext {
    /// Creates a context with no negotiated capabilities and default
    /// timeouts.
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            capabilities: Map::new(),
            timeouts: Timeouts::default(),
        }
    }

    /// Creates a context from a successful `newSession` value.
    ///
    /// Returns `None` when the value carries no string `sessionId`. The
    /// `capabilities` object, if any, becomes the negotiated capabilities and
    /// its `timeouts` entry seeds the session timeouts.
    #[must_use]
    pub fn from_new_session(value: &Value) -> Option<Self> {
        let session_id = value.get("sessionId")?.as_str()?;
        let mut context = Self::new(session_id);
        if let Some(Value::Object(capabilities)) = value.get("capabilities") {
            if let Some(timeouts) = capabilities.get("timeouts") {
                context.timeouts.merge(timeouts);
            }
            context.capabilities = capabilities.clone();
        }
        Some(context)
    }

    /// Session identifier assigned by the remote end.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Capabilities negotiated at session creation.
    #[must_use]
    pub const fn capabilities(&self) -> &Map<String, Value> {
        &self.capabilities
    }

    /// Looks up one negotiated capability.
    #[must_use]
    pub fn capability(&self, name: &str) -> Option<&Value> {
        self.capabilities.get(name)
    }

    /// Active session timeouts.
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Merges a protocol timeouts object into the active timeouts.
    pub fn update_timeouts(&mut self, value: &Value) {
        self.timeouts.merge(value);
    }
}
