//! Reporter double that keeps every lifecycle event for later assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use crate::health::{HealthReporter, Lifecycle};

/// Owned copy of a [`Lifecycle`] event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerStarted(Option<SocketAddr>),
    ListenerStopped,
}

impl From<&Lifecycle<'_>> for HealthEvent {
    fn from(event: &Lifecycle<'_>) -> Self {
        match event {
            Lifecycle::BootstrapStarting => Self::BootstrapStarting,
            Lifecycle::BootstrapSucceeded(_) => Self::BootstrapSucceeded,
            Lifecycle::BootstrapFailed(error) => Self::BootstrapFailed(error.to_string()),
            Lifecycle::ListenerStarted { local_addr, .. } => Self::ListenerStarted(*local_addr),
            Lifecycle::ListenerStopped(_) => Self::ListenerStopped,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    log: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Snapshot of everything observed so far, oldest first.
    pub fn events(&self) -> Vec<HealthEvent> {
        self.log.lock().expect("event log").clone()
    }

    /// Bound TCP address announced by the latest listener start.
    pub fn listener_addr(&self) -> Option<SocketAddr> {
        self.events().into_iter().rev().find_map(|event| match event {
            HealthEvent::ListenerStarted(addr) => addr,
            _ => None,
        })
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn observe(&self, event: &Lifecycle<'_>) {
        self.log.lock().expect("event log").push(event.into());
    }
}
