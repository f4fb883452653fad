//! Accepted client connections, over TCP or a Unix socket.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::TcpStream;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Stream types accepted by the daemon listener.
#[derive(Debug)]
pub(crate) enum ConnectionStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ConnectionStream {
    /// Duplicates the underlying socket handle.
    ///
    /// Used to split a connection into independent read and write halves.
    pub(crate) fn try_clone(&self) -> io::Result<Self> {
        match self {
            Self::Tcp(stream) => stream.try_clone().map(Self::Tcp),
            #[cfg(unix)]
            Self::Unix(stream) => stream.try_clone().map(Self::Unix),
        }
    }

    /// Describes the remote end for log fields.
    pub(crate) fn peer(&self) -> Peer {
        match self {
            Self::Tcp(stream) => stream
                .peer_addr()
                .map_or(Peer::Unknown, |addr| Peer::Tcp(addr.to_string())),
            #[cfg(unix)]
            Self::Unix(_) => Peer::Unix,
        }
    }
}

/// Remote end of an accepted connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Peer {
    Tcp(String),
    Unix,
    Unknown,
}

impl fmt::Display for Peer {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => formatter.write_str(addr),
            Self::Unix => formatter.write_str("unix"),
            Self::Unknown => formatter.write_str("unknown"),
        }
    }
}

impl ConnectionStream {
    fn socket(&mut self) -> &mut dyn Socket {
        match self {
            Self::Tcp(stream) => stream,
            #[cfg(unix)]
            Self::Unix(stream) => stream,
        }
    }
}

trait Socket: Read + Write {}

impl<T: Read + Write> Socket for T {}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.socket().read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.socket().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.socket().flush()
    }
}

/// Serves one accepted client.
///
/// The listener calls `handle` on a dedicated thread and drops the stream
/// once it returns.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    fn handle(&self, stream: ConnectionStream);
}
