//! Deferred execution of promise callbacks.
//!
//! The promise core never calls a handler in the caller's stack frame: every
//! continuation is handed to a [`Scheduler`] as a [`Job`] and runs later, in
//! FIFO order with the other jobs of the same drain.
//!
//! Two schedulers are provided:
//! - [`MicrotaskQueue`]: a caller-driven queue, drained explicitly with
//!   [`run_until_idle`](MicrotaskQueue::run_until_idle).
//! - [`EventLoop`]: a dedicated thread draining jobs as they arrive. Promise
//!   code bound to it runs only on that thread; enter it with
//!   [`EventLoop::spawn`].

mod event_loop;
mod microtask;

pub use event_loop::{EventLoop, EventLoopBuilder};
pub use microtask::MicrotaskQueue;

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A facility that runs jobs later, after the current call unwinds.
///
/// Implementations must:
/// - never run a job synchronously inside `schedule`,
/// - run every accepted job exactly once,
/// - preserve submission order among jobs.
pub trait Scheduler: Send + Sync {
    /// Queues `job` to run after the current call unwinds.
    fn schedule(&self, job: Job);
}
