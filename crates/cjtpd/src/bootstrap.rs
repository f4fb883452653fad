//! Turning configuration into a ready-to-serve daemon.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use cjtp_config::{Config, SocketPreparationError};

use crate::dispatch::Dispatcher;
use crate::health::{HealthReporter, Lifecycle};
use crate::store::CategoryStore;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Source of the daemon configuration.
pub trait ConfigLoader: Send + Sync {
    /// Resolves the configuration from whatever layers the loader reads.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Reads process arguments, `CJTP_*` variables and configuration files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// The step at which bootstrap gave up.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Arguments, environment or configuration files were rejected.
    #[error("configuration rejected: {0}")]
    Configuration(#[source] Arc<OrthoError>),
    /// The log subscriber could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    /// The Unix socket directory could not be created.
    #[error(transparent)]
    Socket(#[from] SocketPreparationError),
}

/// A configured daemon with a freshly seeded store, not yet listening.
pub struct Daemon {
    config: Config,
    store: CategoryStore,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Log format actually in effect for this process.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Store shared by every connection.
    #[must_use]
    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    /// Builds a dispatcher over the daemon's store.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.store.clone())
    }

    pub(crate) fn announce(&self, event: &Lifecycle<'_>) {
        self.reporter.observe(event);
    }
}

/// Loads configuration, installs logging, prepares the socket directory and
/// seeds a fresh category store.
///
/// # Errors
///
/// Returns the [`BootstrapError`] of the first step that fails, after
/// announcing it to `reporter`.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.observe(&Lifecycle::BootstrapStarting);
    match configure(loader) {
        Ok((config, telemetry)) => {
            reporter.observe(&Lifecycle::BootstrapSucceeded(&config));
            Ok(Daemon {
                config,
                store: CategoryStore::seeded(),
                telemetry,
                reporter,
            })
        }
        Err(error) => {
            reporter.observe(&Lifecycle::BootstrapFailed(&error));
            Err(error)
        }
    }
}

fn configure(loader: &dyn ConfigLoader) -> Result<(Config, TelemetryHandle), BootstrapError> {
    let config = loader.load().map_err(BootstrapError::Configuration)?;
    let telemetry = telemetry::initialise(&config)?;
    config.listen_socket().prepare_filesystem()?;
    Ok((config, telemetry))
}
