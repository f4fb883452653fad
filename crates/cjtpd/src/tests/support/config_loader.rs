//! Configuration loaders for tests: fixed endpoints, or a rejected command line.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use cjtp_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Hands out default settings with a fixed endpoint.
pub struct TestConfigLoader {
    endpoint: SocketEndpoint,
    // Keeps a Unix socket's directory alive as long as the loader.
    _scratch: Option<TempDir>,
}

impl TestConfigLoader {
    /// Unix socket inside a not-yet-created `run/` directory of a scratch dir.
    pub fn unix() -> Self {
        let scratch = TempDir::new().expect("scratch dir");
        let socket = scratch.path().join("run").join("cjtpd.sock");
        let socket = socket.to_str().expect("utf8 scratch path").to_owned();
        Self {
            endpoint: SocketEndpoint::unix(socket),
            _scratch: Some(scratch),
        }
    }

    pub fn ephemeral_tcp() -> Self {
        Self::at(SocketEndpoint::tcp("127.0.0.1", 0))
    }

    pub fn at(endpoint: SocketEndpoint) -> Self {
        Self {
            endpoint,
            _scratch: None,
        }
    }

    pub fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            listen_socket: self.endpoint.clone(),
            ..Config::default()
        })
    }
}

/// Runs the real loader over arguments with an unsupported endpoint scheme.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter(
            ["cjtpd", "--listen-socket", "invalid://socket"].map(OsString::from),
        )
    }
}
