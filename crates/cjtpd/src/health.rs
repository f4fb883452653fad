//! Lifecycle reporting for the daemon.
//!
//! Bootstrap and the process supervisor announce each phase change as a
//! [`Lifecycle`] event. The production reporter turns them into structured
//! log records; tests substitute a recorder.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use cjtp_config::{Config, SocketEndpoint};

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// A phase change in the daemon's life.
#[derive(Debug, Clone, Copy)]
pub enum Lifecycle<'a> {
    /// Configuration loading is about to begin.
    BootstrapStarting,
    /// Configuration, telemetry and the socket directory are ready.
    BootstrapSucceeded(&'a Config),
    /// Bootstrap gave up.
    BootstrapFailed(&'a BootstrapError),
    /// The accept loop is running.
    ListenerStarted {
        /// Configured endpoint.
        endpoint: &'a SocketEndpoint,
        /// Bound TCP address, absent for Unix sockets.
        local_addr: Option<SocketAddr>,
    },
    /// The accept loop has exited.
    ListenerStopped(&'a SocketEndpoint),
}

/// Receives lifecycle events.
pub trait HealthReporter: Send + Sync {
    /// Handles one event. Called on the thread that caused it.
    fn observe(&self, event: &Lifecycle<'_>);
}

impl<T: HealthReporter> HealthReporter for Arc<T> {
    fn observe(&self, event: &Lifecycle<'_>) {
        (**self).observe(event);
    }
}

/// Reporter that logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn observe(&self, event: &Lifecycle<'_>) {
        match *event {
            Lifecycle::BootstrapStarting => {
                info!(target: HEALTH_TARGET, event = "bootstrap_starting", "bootstrapping");
            }
            Lifecycle::BootstrapSucceeded(config) => info!(
                target: HEALTH_TARGET,
                event = "bootstrap_succeeded",
                socket = %config.listen_socket(),
                log_filter = %config.log_filter(),
                log_format = %config.log_format(),
                "bootstrap complete"
            ),
            Lifecycle::BootstrapFailed(failure) => error!(
                target: HEALTH_TARGET,
                event = "bootstrap_failed",
                error = %failure,
                "bootstrap failed"
            ),
            Lifecycle::ListenerStarted {
                endpoint,
                local_addr,
            } => info!(
                target: HEALTH_TARGET,
                event = "listener_started",
                %endpoint,
                local_addr = local_addr.map(tracing::field::display),
                "serving categories"
            ),
            Lifecycle::ListenerStopped(endpoint) => info!(
                target: HEALTH_TARGET,
                event = "listener_stopped",
                %endpoint,
                "no longer serving"
            ),
        }
    }
}
