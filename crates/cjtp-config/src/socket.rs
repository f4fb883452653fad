use std::fmt;
use std::fs::DirBuilder;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Endpoint the daemon listens on.
///
/// Text form is a URL: `tcp://127.0.0.1:5000` or `unix:///run/cjtp/cjtpd.sock`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum SocketEndpoint {
    /// Unix domain socket at `path`.
    Unix { path: Utf8PathBuf },
    /// TCP on `host:port`; port `0` asks the OS for a free one.
    Tcp { host: String, port: u16 },
}

impl SocketEndpoint {
    /// Unix endpoint at `path`.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// TCP endpoint on `host` and `port`.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Socket file path, for Unix endpoints only.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }

    /// Makes sure the directory holding a Unix socket exists, creating it
    /// readable by the owner only. A no-op for TCP.
    ///
    /// # Errors
    ///
    /// Returns [`SocketPreparationError`] when the path has no parent or the
    /// directory cannot be created.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(path) = self.unix_path() else {
            return Ok(());
        };
        let directory = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .ok_or_else(|| SocketPreparationError::NoDirectory {
                path: path.to_path_buf(),
            })?;

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        std::os::unix::fs::DirBuilderExt::mode(&mut builder, 0o700);

        match builder.create(directory.as_std_path()) {
            Err(source) if source.kind() != std::io::ErrorKind::AlreadyExists => {
                Err(SocketPreparationError::Create {
                    path: directory.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        let incomplete = |part| SocketParseError::Incomplete {
            endpoint: input.to_owned(),
            part,
        };
        match url.scheme() {
            "tcp" => {
                let host = url.host_str().ok_or_else(|| incomplete("host"))?;
                let port = url.port().ok_or_else(|| incomplete("port"))?;
                Ok(Self::tcp(host, port))
            }
            "unix" => match url.path() {
                "" | "/" => Err(incomplete("socket path")),
                path => Ok(Self::unix(path)),
            },
            scheme => Err(SocketParseError::Scheme(scheme.to_owned())),
        }
    }
}

/// Text that does not describe a usable endpoint.
#[derive(Debug, Error)]
pub enum SocketParseError {
    /// Not a URL at all.
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// Only `tcp` and `unix` are served.
    #[error("'{0}' endpoints are not supported; use tcp:// or unix://")]
    Scheme(String),
    /// A TCP host or port, or a Unix path, is absent.
    #[error("{endpoint} has no {part}")]
    Incomplete {
        /// Endpoint text as given.
        endpoint: String,
        /// Name of the absent component.
        part: &'static str,
    },
}

/// The directory for a Unix socket could not be made ready.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    /// A bare file name gives no directory to create.
    #[error("unix socket path {path} names no directory")]
    NoDirectory {
        /// Configured socket path.
        path: Utf8PathBuf,
    },
    /// Creating the directory failed.
    #[error("cannot create socket directory {path}: {source}")]
    Create {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
