//! Runs the daemon in the foreground until shutdown is requested.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::dispatch::DispatchConnectionHandler;
use crate::health::{HealthReporter, Lifecycle, StructuredHealthReporter};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Serves the configured endpoint until a stop signal arrives.
///
/// Stop signals are hooked before anything else happens, so an early
/// `SIGTERM` still ends in an orderly stop.
///
/// # Errors
///
/// Returns [`LaunchError`] when signal installation, bootstrap or binding
/// fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    let signals = SystemShutdownSignal::install()?;
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &signals,
    )
}

/// Runs the daemon with injected collaborators.
///
/// The accept loop stops once `shutdown` returns. Connections already
/// being served run to completion on their own threads.
pub(crate) fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, reporter)?;

    let listener = SocketListener::bind(daemon.config().listen_socket())?;
    let endpoint = listener.endpoint().clone();
    let local_addr = listener.local_addr();
    let running = listener.start(Arc::new(DispatchConnectionHandler::new(
        daemon.dispatcher(),
    )))?;
    daemon.announce(&Lifecycle::ListenerStarted {
        endpoint: &endpoint,
        local_addr,
    });

    let reason = shutdown.wait();
    let stopped = running.stop();
    daemon.announce(&Lifecycle::ListenerStopped(&endpoint));
    let reason = reason?;
    stopped?;

    info!(target: PROCESS_TARGET, %endpoint, %reason, "daemon stopped");
    Ok(())
}
