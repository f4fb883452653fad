//! Scenario state for bootstrap behaviour: which loader runs and what came of it.

use std::sync::Arc;

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::{HealthEvent, RecordingHealthReporter};
use super::StepResult;

pub struct BootstrapWorld {
    loader: Box<dyn ConfigLoader>,
    reporter: Arc<RecordingHealthReporter>,
    outcome: Option<Result<Daemon, BootstrapError>>,
}

impl BootstrapWorld {
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::unix()),
            reporter: Arc::default(),
            outcome: None,
        }
    }

    /// Swaps the loader; any earlier outcome is forgotten.
    pub fn load_with(&mut self, healthy: bool) {
        self.loader = if healthy {
            Box::new(TestConfigLoader::unix())
        } else {
            Box::new(FailingConfigLoader)
        };
        self.outcome = None;
    }

    pub fn run(&mut self) {
        let reporter = Arc::clone(&self.reporter);
        self.outcome
            .get_or_insert_with(|| bootstrap_with(&*self.loader, reporter));
    }

    pub fn daemon(&self) -> Result<&Daemon, String> {
        match &self.outcome {
            Some(Ok(daemon)) => Ok(daemon),
            Some(Err(error)) => Err(format!("bootstrap failed: {error}")),
            None => Err("bootstrap has not run".to_owned()),
        }
    }

    pub fn failure(&self) -> Result<&BootstrapError, String> {
        match &self.outcome {
            Some(Err(error)) => Ok(error),
            Some(Ok(_)) => Err("bootstrap succeeded".to_owned()),
            None => Err("bootstrap has not run".to_owned()),
        }
    }

    /// Fails unless some recorded event satisfies `wanted`.
    pub fn expect_event(&self, what: &str, wanted: impl Fn(&HealthEvent) -> bool) -> StepResult {
        let events = self.reporter.events();
        if events.iter().any(wanted) {
            Ok(())
        } else {
            Err(format!("no {what} event in {events:?}"))
        }
    }
}

impl Default for BootstrapWorld {
    fn default() -> Self {
        Self::new()
    }
}
