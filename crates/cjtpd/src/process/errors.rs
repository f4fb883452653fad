//! Why a daemon run ended in failure.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Failure of [`run_daemon`](super::run_daemon), by phase.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration or telemetry setup failed; nothing was bound.
    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),
    /// The endpoint could not be served or the accept loop died.
    #[error("listener failed: {0}")]
    Listener(#[from] ListenerError),
    /// Stop signals could not be hooked.
    #[error(transparent)]
    Signals(#[from] ShutdownError),
}
