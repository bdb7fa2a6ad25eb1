use crate::scheduler::Job;
use crate::utils::lock;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// What the loop thread should do next.
pub(crate) enum Step {
    /// Run this job.
    Run(Job),

    /// Nothing queued; park.
    Idle,

    /// Shut down and the queue is drained; exit.
    Closed,
}

/// Job queue feeding the event loop thread.
///
/// Producers push from any thread; the loop thread takes from the front
/// and parks on the condition variable while the queue is empty.
pub(crate) struct Injector {
    /// Jobs waiting to run, oldest first.
    queue: Mutex<VecDeque<Job>>,

    /// Wakes the parked loop thread.
    condvar: Condvar,

    /// Set once the loop stops accepting work. Only written under the
    /// queue lock.
    shutdown: AtomicBool,
}

impl Injector {
    /// Creates a new empty injector.
    pub(crate) fn new() -> Self {
        Injector {
            queue: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Stops accepting jobs and wakes the loop thread.
    ///
    /// Jobs accepted before this call still run.
    pub(crate) fn shutdown(&self) {
        let _queue = lock(&self.queue);

        self.shutdown.store(true, Ordering::Release);
        self.condvar.notify_all();
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Pushes a job, handing it back if the loop has shut down.
    pub(crate) fn push(&self, job: Job) -> Result<(), Job> {
        let mut queue = lock(&self.queue);

        if self.is_shutdown() {
            return Err(job);
        }

        queue.push_back(job);
        self.condvar.notify_one();
        Ok(())
    }

    /// Parks the calling thread until a job arrives, shutdown is signalled,
    /// or `timeout` elapses.
    pub(crate) fn park(&self, timeout: Duration) {
        let queue = lock(&self.queue);

        if !queue.is_empty() || self.is_shutdown() {
            return;
        }

        let _ = self.condvar.wait_timeout(queue, timeout);
    }

    /// Takes the oldest job, reporting `Closed` only once the queue is empty
    /// after shutdown.
    pub(crate) fn next(&self) -> Step {
        let mut queue = lock(&self.queue);

        match queue.pop_front() {
            Some(job) => Step::Run(job),
            None if self.is_shutdown() => Step::Closed,
            None => Step::Idle,
        }
    }
}
