//! Accept loop for the daemon socket.
//!
//! [`SocketListener::bind`] claims the endpoint (reclaiming a stale Unix
//! socket file if one is left over), and [`SocketListener::start`] moves it
//! onto an accept thread that polls a non-blocking socket so it can notice a
//! stop request. Each accepted connection gets its own named thread. A Unix
//! socket file lives exactly as long as the bound socket that created it.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use cjtp_config::SocketEndpoint;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::{Path, PathBuf};

/// Pause between polls while no client is waiting.
const IDLE_POLL: Duration = Duration::from_millis(25);
/// Pause after an accept failure before trying again.
const FAILURE_PAUSE: Duration = Duration::from_millis(150);

/// Endpoint bound and ready to accept.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    socket: BoundSocket,
}

impl SocketListener {
    /// Binds `endpoint`.
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let socket = match endpoint {
            SocketEndpoint::Tcp { host, port } => BoundSocket::tcp(endpoint, host, *port)?,
            SocketEndpoint::Unix { path } => BoundSocket::unix(endpoint, path.as_std_path())?,
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            socket,
        })
    }

    /// Bound TCP address, useful when the configured port was `0`.
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr()
    }

    pub(crate) fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }

    /// Hands the socket to a background accept loop serving `handler`.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<RunningListener, ListenerError> {
        self.socket
            .set_nonblocking()
            .map_err(|source| ListenerError::Start { source })?;

        let stop = Arc::new(AtomicBool::new(false));
        let accept_loop = AcceptLoop {
            listener: self,
            handler,
            stop: Arc::clone(&stop),
            accepted: 0,
        };
        let thread = thread::Builder::new()
            .name("cjtp-accept".to_owned())
            .spawn(move || accept_loop.run())
            .map_err(|source| ListenerError::Start { source })?;

        Ok(RunningListener {
            stop,
            thread: Some(thread),
        })
    }
}

/// Accept loop running in the background.
///
/// Dropping it asks the loop to stop without waiting.
pub(crate) struct RunningListener {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl RunningListener {
    /// Stops accepting and waits for the loop to exit.
    ///
    /// Connections already accepted keep running on their own threads.
    pub(crate) fn stop(mut self) -> Result<(), ListenerError> {
        self.stop.store(true, Ordering::Release);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| ListenerError::AcceptPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for RunningListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

struct AcceptLoop {
    listener: SocketListener,
    handler: Arc<dyn ConnectionHandler>,
    stop: Arc<AtomicBool>,
    accepted: u64,
}

impl AcceptLoop {
    fn run(mut self) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.listener.endpoint,
            "accepting connections"
        );

        let mut reported = None::<io::ErrorKind>;
        while !self.stop.load(Ordering::Acquire) {
            match self.listener.socket.accept() {
                Ok(stream) => {
                    reported = None;
                    self.accepted += 1;
                    self.serve(stream);
                }
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                    ) =>
                {
                    thread::sleep(IDLE_POLL);
                }
                Err(error) => {
                    // Log each distinct failure once until an accept succeeds.
                    if reported != Some(error.kind()) {
                        warn!(target: LISTENER_TARGET, %error, "accept failed");
                        reported = Some(error.kind());
                    }
                    thread::sleep(FAILURE_PAUSE);
                }
            }
        }

        info!(
            target: LISTENER_TARGET,
            endpoint = %self.listener.endpoint,
            accepted = self.accepted,
            "no longer accepting connections"
        );
    }

    fn serve(&self, stream: ConnectionStream) {
        let connection = self.accepted;
        let peer = stream.peer();
        debug!(target: LISTENER_TARGET, connection, %peer, "connection accepted");

        let handler = Arc::clone(&self.handler);
        let spawned = thread::Builder::new()
            .name(format!("cjtp-conn-{connection}"))
            .spawn(move || {
                handler.handle(stream);
                debug!(target: LISTENER_TARGET, connection, %peer, "connection closed");
            });
        if let Err(error) = spawned {
            warn!(
                target: LISTENER_TARGET,
                connection,
                %error,
                "dropping connection: no thread available"
            );
        }
    }
}

#[derive(Debug)]
enum BoundSocket {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix {
        listener: UnixListener,
        path: PathBuf,
    },
}

impl BoundSocket {
    fn tcp(endpoint: &SocketEndpoint, host: &str, port: u16) -> Result<Self, ListenerError> {
        let unresolved = |source| ListenerError::Unresolved {
            endpoint: endpoint.to_string(),
            source,
        };
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|error| unresolved(Some(error)))?
            .next()
            .ok_or_else(|| unresolved(None))?;
        TcpListener::bind(addr)
            .map(Self::Tcp)
            .map_err(|source| ListenerError::Bind {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    #[cfg(unix)]
    fn unix(endpoint: &SocketEndpoint, path: &Path) -> Result<Self, ListenerError> {
        reclaim_socket_path(path)?;
        let listener = UnixListener::bind(path).map_err(|source| ListenerError::Bind {
            endpoint: endpoint.to_string(),
            source,
        })?;
        Ok(Self::Unix {
            listener,
            path: path.to_path_buf(),
        })
    }

    #[cfg(not(unix))]
    fn unix(endpoint: &SocketEndpoint, _path: &std::path::Path) -> Result<Self, ListenerError> {
        Err(ListenerError::Bind {
            endpoint: endpoint.to_string(),
            source: io::Error::new(
                io::ErrorKind::Unsupported,
                "unix sockets need a unix host",
            ),
        })
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            Self::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Self::Unix { .. } => None,
        }
    }

    fn set_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix { listener, .. } => listener.set_nonblocking(true),
        }
    }

    /// Accepts one pending client as a blocking stream.
    fn accept(&self) -> io::Result<ConnectionStream> {
        match self {
            Self::Tcp(listener) => {
                let (stream, _) = listener.accept()?;
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Tcp(stream))
            }
            #[cfg(unix)]
            Self::Unix { listener, .. } => {
                let (stream, _) = listener.accept()?;
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Unix(stream))
            }
        }
    }
}

#[cfg(unix)]
impl Drop for BoundSocket {
    fn drop(&mut self) {
        let Self::Unix { path, .. } = self else {
            return;
        };
        if let Err(error) = std::fs::remove_file(&*path)
            && error.kind() != io::ErrorKind::NotFound
        {
            warn!(
                target: LISTENER_TARGET,
                %error,
                path = %path.display(),
                "unix socket file left behind"
            );
        }
    }
}

/// Clears the way for a new Unix socket at `path`.
///
/// A socket file nobody answers on is removed. A live socket or a
/// non-socket file is an error.
#[cfg(unix)]
fn reclaim_socket_path(path: &Path) -> Result<(), ListenerError> {
    let path_text = || path.display().to_string();
    let stale = |source| ListenerError::StaleSocket {
        path: path_text(),
        source,
    };

    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(stale(error)),
    };
    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotASocket { path: path_text() });
    }

    match UnixStream::connect(path) {
        Ok(_) => Err(ListenerError::SocketBusy { path: path_text() }),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            debug!(target: LISTENER_TARGET, path = %path.display(), "removing stale unix socket");
            std::fs::remove_file(path).map_err(stale)
        }
        Err(error) => Err(stale(error)),
    }
}
