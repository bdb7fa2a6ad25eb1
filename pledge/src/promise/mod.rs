//! The promise type and its settlement machinery.
//!
//! - `core`: the settle-once state machine and continuation queue,
//! - `deferred`: the promise/settler pair and producer capabilities,
//! - `resolve`: the resolution procedure following promises and thenables,
//! - `future`: the bridge to `async`/`.await`.

mod core;
mod deferred;
mod future;
mod resolve;
mod state;

pub use self::core::{Handler, handler};
pub use deferred::{Deferred, Resolvers, Settler};
pub use future::PromiseFuture;
pub use state::State;

use self::core::{Core, Subscriber};
use crate::scheduler::Scheduler;
use crate::utils::catch_fault;
use crate::value::Value;

use std::fmt;
use std::sync::Arc;

/// The eventual result of an asynchronous operation.
///
/// A `Promise` starts pending and settles at most once, to a fulfillment
/// value or a rejection reason. Clones share the same underlying state;
/// holding a `Promise` never grants the ability to settle it.
#[derive(Clone)]
pub struct Promise {
    pub(crate) core: Arc<Core>,
}

impl Promise {
    /// Creates a promise driven by a producer.
    ///
    /// `work` runs synchronously, before `new` returns, and receives the
    /// [`Resolvers`] of the new promise. If it returns `Err` or panics before
    /// resolving, the promise is rejected with that fault.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pledge::{MicrotaskQueue, Promise, Value};
    /// use std::sync::Arc;
    ///
    /// let queue = Arc::new(MicrotaskQueue::new());
    /// let promise = Promise::new(queue.clone(), |resolvers| {
    ///     resolvers.resolve("done");
    ///     Ok(())
    /// });
    ///
    /// assert_eq!(promise.outcome(), Some(Ok(Value::from("done"))));
    /// ```
    pub fn new<W>(scheduler: Arc<dyn Scheduler>, work: W) -> Self
    where
        W: FnOnce(Resolvers) -> Result<(), Value>,
    {
        let Deferred { promise, settler } = Deferred::new(scheduler);
        let resolvers = Resolvers::new(settler);

        let producer = resolvers.clone();
        if let Err(reason) = catch_fault(move || work(producer)) {
            resolvers.reject(reason);
        }

        promise
    }

    /// A promise resolved with `x`, following it if it is thenable.
    pub fn resolved(scheduler: Arc<dyn Scheduler>, x: impl Into<Value>) -> Self {
        let deferred = Deferred::new(scheduler);
        deferred.settler.resolve(x);
        deferred.promise
    }

    /// A promise rejected with `reason`.
    pub fn rejected(scheduler: Arc<dyn Scheduler>, reason: impl Into<Value>) -> Self {
        let deferred = Deferred::new(scheduler);
        deferred.settler.reject(reason);
        deferred.promise
    }

    /// Registers continuations and returns the promise they settle.
    ///
    /// The returned promise is always a new instance. Handlers never run
    /// before `then` returns, even if `self` has already settled.
    ///
    /// - A present handler is called with the value (or reason) and its
    ///   result resolves the returned promise; an `Err` or panic rejects it.
    /// - A missing handler passes the settlement through unchanged.
    pub fn then(&self, on_fulfilled: Option<Handler>, on_rejected: Option<Handler>) -> Promise {
        let Deferred { promise, settler } = Deferred::new(self.core.scheduler());

        self.core.subscribe(Subscriber {
            next: settler,
            on_fulfilled,
            on_rejected,
        });

        promise
    }

    /// Shorthand for `then(None, Some(on_rejected))`.
    pub fn catch(&self, on_rejected: Handler) -> Promise {
        self.then(None, Some(on_rejected))
    }

    /// The current state. A settled promise never changes state again.
    pub fn state(&self) -> State {
        self.core.state()
    }

    /// The settled result: `Ok(value)` if fulfilled, `Err(reason)` if
    /// rejected, `None` while pending.
    pub fn outcome(&self) -> Option<Result<Value, Value>> {
        self.core.outcome().cloned().map(|outcome| outcome.into_result())
    }

    /// Whether `a` and `b` are the same promise instance.
    pub fn ptr_eq(a: &Promise, b: &Promise) -> bool {
        Arc::ptr_eq(&a.core, &b.core)
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
