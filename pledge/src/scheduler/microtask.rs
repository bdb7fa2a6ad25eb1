use super::{Job, Scheduler};
use crate::utils::lock;

use std::collections::VecDeque;
use std::sync::Mutex;

/// A cooperative FIFO job queue.
///
/// Scheduling only enqueues; nothing runs until the owner drains the queue.
/// This makes the order of callbacks fully deterministic, which is what a
/// single-threaded host (or a test) wants.
///
/// # Examples
///
/// ```rust
/// use pledge::{Deferred, MicrotaskQueue, Value, handler};
/// use std::sync::Arc;
///
/// let queue = Arc::new(MicrotaskQueue::new());
/// let deferred = Deferred::new(queue.clone());
///
/// let doubled = deferred.promise.then(
///     Some(handler(|v| Ok(Value::from(v.as_number().unwrap_or(0.0) * 2.0)))),
///     None,
/// );
/// deferred.settler.fulfill(Value::from(10));
///
/// queue.run_until_idle();
/// assert_eq!(doubled.outcome(), Some(Ok(Value::from(20))));
/// ```
#[derive(Default)]
pub struct MicrotaskQueue {
    /// Pending jobs, oldest first.
    jobs: Mutex<VecDeque<Job>>,
}

impl MicrotaskQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the oldest pending job.
    ///
    /// The queue lock is released before the job runs, so the job may
    /// schedule more work. Returns `false` if the queue was empty.
    pub fn run_once(&self) -> bool {
        let job = lock(&self.jobs).pop_front();

        match job {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Drains the queue, including jobs scheduled while draining.
    ///
    /// Returns the number of jobs that ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;

        while self.run_once() {
            ran += 1;
        }

        ran
    }

    /// Number of jobs waiting to run.
    pub fn len(&self) -> usize {
        lock(&self.jobs).len()
    }

    /// Whether no job is waiting to run.
    pub fn is_empty(&self) -> bool {
        lock(&self.jobs).is_empty()
    }
}

impl Scheduler for MicrotaskQueue {
    fn schedule(&self, job: Job) {
        lock(&self.jobs).push_back(job);
    }
}
