//! Waiting for the request to stop serving.

use std::fmt;
use std::io;
use std::sync::{Mutex, PoisonError};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::low_level::signal_name;
use thiserror::Error;

/// Signals that end the daemon.
const STOP_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Blocks the launch thread until the daemon should stop.
pub trait ShutdownSignal: Send + Sync {
    /// Returns once shutdown should begin, reporting what asked for it.
    fn wait(&self) -> Result<StopReason, ShutdownError>;
}

/// What ended the serving phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A process signal arrived.
    Signal(i32),
    /// Code in the same process asked for the stop.
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(signal) => match signal_name(*signal) {
                Some(name) => formatter.write_str(name),
                None => write!(formatter, "signal {signal}"),
            },
            Self::Requested => formatter.write_str("stop requested"),
        }
    }
}

/// The stop signals could not be hooked.
#[derive(Debug, Error)]
#[error("cannot install signal handlers: {0}")]
pub struct ShutdownError(#[from] io::Error);

/// Waits for `SIGTERM`, `SIGINT`, `SIGQUIT` or `SIGHUP`.
///
/// Handlers are registered by [`SystemShutdownSignal::install`], so a signal
/// delivered while the daemon is still starting is held until [`wait`]
/// rather than killing the process with its socket file in place.
///
/// [`wait`]: ShutdownSignal::wait
pub struct SystemShutdownSignal {
    signals: Mutex<Signals>,
}

impl SystemShutdownSignal {
    /// Registers the stop signal handlers.
    ///
    /// # Errors
    ///
    /// Returns [`ShutdownError`] when the handlers cannot be registered.
    pub fn install() -> Result<Self, ShutdownError> {
        let signals = Signals::new(STOP_SIGNALS)?;
        Ok(Self {
            signals: Mutex::new(signals),
        })
    }
}

impl fmt::Debug for SystemShutdownSignal {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SystemShutdownSignal")
            .field("signals", &STOP_SIGNALS)
            .finish()
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<StopReason, ShutdownError> {
        let mut signals = self.signals.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(signals
            .forever()
            .next()
            .map_or(StopReason::Requested, StopReason::Signal))
    }
}
