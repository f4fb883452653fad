//! Failures while opening or running the daemon socket.

use std::io;

use thiserror::Error;

/// Errors surfaced while binding or running the socket listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The TCP host did not resolve to any address.
    #[error("{endpoint} does not resolve to a socket address")]
    Unresolved {
        /// Endpoint as configured.
        endpoint: String,
        /// Resolver failure, when there was one.
        #[source]
        source: Option<io::Error>,
    },
    /// The operating system refused the bind.
    #[error("cannot listen on {endpoint}: {source}")]
    Bind {
        /// Endpoint as configured.
        endpoint: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Another process still answers on the Unix socket path.
    #[error("unix socket {path} is held by a running server")]
    SocketBusy {
        /// Socket path.
        path: String,
    },
    /// Something other than a socket sits at the configured path.
    #[error("{path} exists and is not a unix socket")]
    NotASocket {
        /// Offending path.
        path: String,
    },
    /// A leftover socket file could not be inspected or removed.
    #[error("cannot reclaim stale unix socket {path}: {source}")]
    StaleSocket {
        /// Socket path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The accept loop could not be configured or spawned.
    #[error("cannot start the accept loop: {source}")]
    Start {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The accept loop thread panicked.
    #[error("accept loop panicked")]
    AcceptPanicked,
}
