//! Global `tracing` subscriber for processes hosting dispatchers.
//!
//! Every dispatcher in a process logs through one subscriber. Events go to
//! stderr with RFC 3339 UTC timestamps; colour is enabled only when stderr is
//! a terminal. The filter comes from [`Config::log_filter`] unless
//! [`LOG_FILTER_ENV`] is set.

use std::env;
use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::logging::{LOG_FILTER_ENV, effective_filter};
use crate::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Proof that the global subscriber is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Failures while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directives did not parse.
    #[error("invalid log filter '{directives}': {message}")]
    Filter {
        /// Directives that were rejected.
        directives: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another global subscriber was installed first.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[source] TryInitError),
}

/// Installs the global subscriber once per process.
///
/// Only the first successful call installs anything; later calls return a
/// handle immediately, so each dispatcher host may call this on start-up.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for unparsable directives and
/// [`TelemetryError::Subscriber`] when a different subscriber already owns
/// the global slot.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config))
        .map(|_| TelemetryHandle)
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let from_env = env::var(LOG_FILTER_ENV).ok();
    let directives = effective_filter(config.log_filter(), from_env.as_deref());
    let filter = EnvFilter::try_new(directives).map_err(|error| TelemetryError::Filter {
        directives: directives.to_owned(),
        message: error.to_string(),
    })?;

    Registry::default()
        .with(output_layer(config.log_format()))
        .with(filter)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn output_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    let stderr = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_thread_names(true)
        .with_target(true);
    match format {
        LogFormat::Json => stderr.json().flatten_event(true).boxed(),
        LogFormat::Compact => stderr.compact().boxed(),
    }
}
