//! A whole daemon run on a background thread, driven by BDD steps.

use std::net::SocketAddr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::bootstrap::ConfigLoader;
use crate::dispatch::Response;
use crate::process::LaunchError;
use crate::process::launch::run_daemon_with;
use crate::process::shutdown::{ShutdownError, ShutdownSignal, StopReason};

use super::StepResult;
use super::client::LineClient;
use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(2);

type RunOutcome = Result<(), LaunchError>;

#[derive(Default)]
pub struct ProcessTestWorld {
    pub reporter: Arc<RecordingHealthReporter>,
    stop: Option<Sender<()>>,
    run: Option<JoinHandle<RunOutcome>>,
    outcome: Option<RunOutcome>,
    clients: Vec<LineClient>,
    response: Option<Response>,
}

impl ProcessTestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launches on an ephemeral loopback port and waits until it listens.
    pub fn start(&mut self) -> StepResult {
        self.launch(Box::new(TestConfigLoader::ephemeral_tcp()));
        self.listener_addr().map(drop)
    }

    /// Launches with arguments the configuration loader rejects.
    pub fn start_with_invalid_config(&mut self) {
        self.launch(Box::new(FailingConfigLoader));
    }

    fn launch(&mut self, loader: Box<dyn ConfigLoader>) {
        let (stop, requests) = mpsc::channel();
        let reporter = Arc::clone(&self.reporter);
        self.stop = Some(stop);
        self.run = Some(thread::spawn(move || {
            let switch = StopSwitch {
                requests: Mutex::new(requests),
            };
            run_daemon_with(&*loader, reporter, &switch)
        }));
    }

    fn listener_addr(&self) -> Result<SocketAddr, String> {
        let deadline = Instant::now() + STARTUP_TIMEOUT;
        loop {
            if let Some(addr) = self.reporter.listener_addr() {
                return Ok(addr);
            }
            if Instant::now() >= deadline {
                return Err(format!(
                    "daemon never listened; events: {:?}",
                    self.reporter.events()
                ));
            }
            thread::sleep(Duration::from_millis(20));
        }
    }

    /// Opens one more client; later sends go through it.
    pub fn connect(&mut self) -> StepResult {
        let addr = self.listener_addr()?;
        self.clients.push(LineClient::connect(addr));
        Ok(())
    }

    /// Sends `line` on the newest client and keeps the reply.
    pub fn send(&mut self, line: &str) -> StepResult {
        let client = self.clients.last_mut().ok_or("no client connected")?;
        self.response = Some(client.exchange(line));
        Ok(())
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn trigger_shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }

    /// Waits for the run to finish and keeps its outcome.
    pub fn join(&mut self) -> StepResult {
        let run = self.run.take().ok_or("daemon was never launched")?;
        let outcome = run.join().map_err(|_| "daemon thread panicked")?;
        self.outcome = Some(outcome);
        Ok(())
    }

    pub fn result(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }
}

impl Drop for ProcessTestWorld {
    fn drop(&mut self) {
        self.trigger_shutdown();
        if let Some(run) = self.run.take() {
            let _ = run.join();
        }
    }
}

/// Stops the daemon when a message arrives or every sender is gone.
struct StopSwitch {
    requests: Mutex<Receiver<()>>,
}

impl ShutdownSignal for StopSwitch {
    fn wait(&self) -> Result<StopReason, ShutdownError> {
        let _ = self.requests.lock().expect("stop switch").recv();
        Ok(StopReason::Requested)
    }
}
