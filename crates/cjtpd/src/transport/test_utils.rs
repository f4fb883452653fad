//! Test handlers for the transport module.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use super::{ConnectionHandler, ConnectionStream};

/// Records how many connections reached the handler, then hangs up.
#[derive(Default)]
pub(crate) struct TallyHandler {
    served: Mutex<usize>,
    changed: Condvar,
}

impl TallyHandler {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Blocks until `expected` connections were served, for at most two
    /// seconds. Returns whether the tally got there.
    pub(crate) fn wait_for(&self, expected: usize) -> bool {
        let served = self.served.lock().expect("tally lock");
        let (served, _) = self
            .changed
            .wait_timeout_while(served, Duration::from_secs(2), |served| *served < expected)
            .expect("tally wait");
        *served >= expected
    }
}

impl ConnectionHandler for TallyHandler {
    fn handle(&self, _stream: ConnectionStream) {
        *self.served.lock().expect("tally lock") += 1;
        self.changed.notify_all();
    }
}
