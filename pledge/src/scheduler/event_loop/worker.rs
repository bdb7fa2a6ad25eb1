use super::injector::{Injector, Step};
use crate::error::Error;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// The loop body run on the event loop thread.
///
/// The execution order is:
/// 1. Run the oldest queued job
/// 2. Exit if shutdown was signalled and nothing is left
/// 3. Park until more work arrives
pub(crate) struct Worker {
    injector: Arc<Injector>,

    /// Upper bound on a single park.
    park_timeout: Duration,
}

impl Worker {
    /// Creates a new worker draining `injector`.
    pub(crate) fn new(injector: Arc<Injector>, park_timeout: Duration) -> Self {
        Self {
            injector,
            park_timeout,
        }
    }

    pub(crate) fn run(&self) {
        loop {
            match self.injector.next() {
                Step::Run(job) => {
                    // Promise jobs catch their own faults; this only guards
                    // foreign jobs so one of them cannot kill the loop.
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                        tracing::warn!(error = %Error::from_panic(payload), "event loop job panicked");
                    }
                }
                Step::Idle => self.injector.park(self.park_timeout),
                Step::Closed => break,
            }
        }

        tracing::trace!("event loop worker stopped");
    }
}
