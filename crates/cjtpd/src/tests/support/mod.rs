//! Test harness utilities for the daemon behavioural suites.

mod client;
mod config_loader;
mod process_world;
mod reporter;
mod world;

pub use client::LineClient;
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use process_world::ProcessTestWorld;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::BootstrapWorld;

/// Outcome of a BDD step; the error text becomes the failure message.
pub type StepResult = Result<(), String>;
