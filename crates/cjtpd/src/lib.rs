//! Category JSON Transfer Protocol daemon.
//!
//! The daemon serves a small in-memory collection of product categories over
//! a raw byte stream. Clients write one JSON request envelope per line and
//! read one JSON response envelope per line; the listen endpoint comes from
//! [`cjtp_config`].
//!
//! Requests pass through three stages, each of which can end the request
//! with a canonical status:
//!
//! 1. **Grammar**: [`dispatch::validator`] reports every missing or illegal
//!    envelope member at once as `4 Bad Request`.
//! 2. **Routing**: [`dispatch::parse_path`] resolves `/api/categories` and
//!    `/api/categories/{id}`; anything else is `5 Not Found`.
//! 3. **Store**: [`Dispatcher`] applies `create`, `read`, `update` or
//!    `delete` to the shared [`CategoryStore`]; `echo` returns its body
//!    unchanged.
//!
//! The store lives only as long as the process and starts from the same
//! three seed categories on every launch.

mod bootstrap;
pub mod dispatch;
mod health;
mod process;
pub mod store;
mod telemetry;
mod transport;

pub use bootstrap::{BootstrapError, ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
pub use dispatch::{Dispatcher, Request, Response, Status, validate};
pub use health::{HealthReporter, Lifecycle, StructuredHealthReporter};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, StopReason, SystemShutdownSignal, run_daemon,
};
pub use store::{Category, CategoryId, CategoryStore};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::ListenerError;

#[cfg(test)]
mod tests;
