mod builder;
mod injector;
mod worker;

pub use builder::EventLoopBuilder;

use injector::Injector;
use worker::Worker;

use super::{Job, Scheduler};
use crate::error::Error;

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

/// A scheduler backed by a dedicated thread.
///
/// Jobs run one at a time on the loop thread, in submission order. All
/// promise code for promises bound to [`handle`](EventLoop::handle) must run
/// on that thread: enter it with [`spawn`](EventLoop::spawn) and build,
/// settle and chain promises from inside the job. The handle refuses jobs
/// scheduled from any other thread, so a handler can never run concurrently
/// with the code that registered it. Awaiting a loop promise is fine from
/// any thread.
///
/// Shutting down stops accepting jobs but runs every job accepted before
/// it. Continuations scheduled while the queue drains are refused.
pub struct EventLoop {
    injector: Arc<Injector>,

    /// Id of the loop thread.
    owner: ThreadId,

    /// Join handle of the loop thread, taken on shutdown.
    thread: Option<JoinHandle<()>>,
}

/// Cloneable scheduling handle onto a running [`EventLoop`].
#[derive(Clone)]
struct LoopHandle {
    injector: Arc<Injector>,
    owner: ThreadId,
}

impl EventLoop {
    /// Starts an event loop with the default configuration.
    pub fn new() -> io::Result<Self> {
        EventLoopBuilder::new().build()
    }

    pub(crate) fn start(name: String, park_timeout: Duration) -> io::Result<Self> {
        let injector = Arc::new(Injector::new());
        let worker = Worker::new(injector.clone(), park_timeout);

        let thread = thread::Builder::new().name(name).spawn(move || worker.run())?;

        Ok(Self {
            injector,
            owner: thread.thread().id(),
            thread: Some(thread),
        })
    }

    /// Queues a job on the loop thread. Callable from any thread.
    ///
    /// Returns [`Error::SchedulerGone`] once the loop has shut down.
    pub fn spawn(&self, job: Job) -> Result<(), Error> {
        self.injector.push(job).map_err(|_| Error::SchedulerGone)
    }

    /// A scheduler handle usable by promises, valid for the life of the loop.
    pub fn handle(&self) -> Arc<dyn Scheduler> {
        Arc::new(LoopHandle {
            injector: self.injector.clone(),
            owner: self.owner,
        })
    }

    /// Stops accepting jobs, drains the queue and waits for the thread to
    /// exit.
    pub fn shutdown(&mut self) {
        self.injector.shutdown();

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl LoopHandle {
    fn try_schedule(&self, job: Job) -> Result<(), Error> {
        if thread::current().id() != self.owner {
            return Err(Error::ForeignThread);
        }

        self.injector.push(job).map_err(|_| Error::SchedulerGone)
    }
}

impl Scheduler for LoopHandle {
    fn schedule(&self, job: Job) {
        if let Err(err) = self.try_schedule(job) {
            tracing::warn!(error = %err, "dropping refused event loop job");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::mpsc;

    #[test]
    fn test_jobs_run_in_order() {
        let event_loop = EventLoop::new().unwrap();
        let (tx, rx) = mpsc::channel();

        for i in 0..5 {
            let tx = tx.clone();
            event_loop.spawn(Box::new(move || tx.send(i).unwrap())).unwrap();
        }

        let seen: Vec<i32> = (0..5).map(|_| rx.recv().unwrap()).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_spawn_after_shutdown_fails() {
        let mut event_loop = EventLoop::new().unwrap();
        let handle = event_loop.handle();
        event_loop.shutdown();

        let result = event_loop.spawn(Box::new(|| {}));
        assert_eq!(result, Err(Error::SchedulerGone));

        // The handle drops the job without panicking.
        handle.schedule(Box::new(|| {}));
    }

    #[test]
    fn test_handle_refuses_foreign_thread() {
        let event_loop = EventLoop::new().unwrap();
        let handle = LoopHandle {
            injector: event_loop.injector.clone(),
            owner: event_loop.owner,
        };

        let result = handle.try_schedule(Box::new(|| {}));
        assert_eq!(result, Err(Error::ForeignThread));

        let (tx, rx) = mpsc::channel();
        let on_loop = handle.clone();
        event_loop
            .spawn(Box::new(move || {
                let result = on_loop.try_schedule(Box::new(move || tx.send(7).unwrap()));
                assert!(result.is_ok());
            }))
            .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
    }

    #[test]
    fn test_shutdown_runs_accepted_jobs() {
        let mut event_loop = EventLoop::new().unwrap();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (tx, rx) = mpsc::channel();

        event_loop
            .spawn(Box::new(move || release_rx.recv().unwrap()))
            .unwrap();
        event_loop.spawn(Box::new(move || tx.send("second").unwrap())).unwrap();

        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            release_tx.send(()).unwrap();
        });
        event_loop.shutdown();
        releaser.join().unwrap();

        assert_eq!(rx.try_recv(), Ok("second"));
    }

    #[test]
    fn test_panicking_job_does_not_stop_loop() {
        let event_loop = EventLoop::new().unwrap();
        let (tx, rx) = mpsc::channel();

        event_loop.spawn(Box::new(|| panic!("job failed"))).unwrap();
        event_loop.spawn(Box::new(move || tx.send(42).unwrap())).unwrap();

        assert_eq!(rx.recv().unwrap(), 42);
    }

    #[test]
    #[should_panic(expected = "park_timeout must be > 0")]
    fn test_zero_park_timeout_panics() {
        let _ = EventLoopBuilder::new().park_timeout(Duration::ZERO);
    }
}
