use super::deferred::Settler;
use super::resolve::resolve;
use super::state::{Outcome, State};
use crate::scheduler::Scheduler;
use crate::utils::{catch_fault, lock};
use crate::value::Value;

use std::mem;
use std::sync::{Arc, Mutex, OnceLock};
use std::task::Waker;

/// A continuation handler registered with [`Promise::then`](super::Promise::then).
///
/// Receives the settled value or reason. Returning `Err` is the equivalent of
/// throwing: the downstream promise is rejected with the error. A panic is
/// treated the same way.
pub type Handler = Box<dyn FnOnce(Value) -> Result<Value, Value> + Send + 'static>;

/// Boxes a closure into a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: FnOnce(Value) -> Result<Value, Value> + Send + 'static,
{
    Box::new(f)
}

/// A pending continuation waiting for a promise to settle.
pub(crate) struct Subscriber {
    /// Settles the promise returned by `then`.
    pub(crate) next: Settler,

    /// Runs on fulfillment; `None` passes the value through.
    pub(crate) on_fulfilled: Option<Handler>,

    /// Runs on rejection; `None` passes the reason through.
    pub(crate) on_rejected: Option<Handler>,
}

impl Subscriber {
    /// Drives one continuation against a settled result.
    ///
    /// Always called from a scheduled job, never from `then` or `settle`.
    fn run(self, outcome: Outcome) {
        let Subscriber {
            next,
            on_fulfilled,
            on_rejected,
        } = self;

        let handler = match &outcome {
            Outcome::Fulfilled(_) => on_fulfilled,
            Outcome::Rejected(_) => on_rejected,
        };

        match handler {
            Some(handler) => {
                let value = outcome.into_value();

                match catch_fault(move || handler(value)) {
                    Ok(x) => resolve(&next, x),
                    Err(reason) => next.reject(reason),
                }
            }
            None => {
                let forward = next.clone();
                let forwarded = catch_fault(move || {
                    forward.settle(outcome);
                    Ok(())
                });

                if let Err(reason) = forwarded {
                    next.reject(reason);
                }
            }
        }
    }
}

/// Work waiting for a promise to settle.
#[derive(Default)]
struct Waiting {
    /// Continuations registered with `then`, in registration order.
    subscribers: Vec<Subscriber>,

    /// Wakers of futures awaiting the promise.
    wakers: Vec<Waker>,
}

/// The settlement state machine behind one promise.
///
/// `outcome` is written exactly once, while the `waiting` lock is held, and
/// the waiting lists are drained in the same critical section. The state is
/// read from `outcome`, so a result is visible if and only if the promise is
/// no longer pending.
pub(crate) struct Core {
    /// The settled result; empty while pending.
    outcome: OnceLock<Outcome>,

    /// Continuations and wakers registered while pending.
    waiting: Mutex<Waiting>,

    /// Where continuations are dispatched.
    scheduler: Arc<dyn Scheduler>,
}

impl Core {
    /// Creates a new pending core dispatching on `scheduler`.
    pub(crate) fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            outcome: OnceLock::new(),
            waiting: Mutex::new(Waiting::default()),
            scheduler,
        }
    }

    pub(crate) fn state(&self) -> State {
        self.outcome.get().map_or(State::Pending, Outcome::state)
    }

    pub(crate) fn outcome(&self) -> Option<&Outcome> {
        self.outcome.get()
    }

    pub(crate) fn scheduler(&self) -> Arc<dyn Scheduler> {
        self.scheduler.clone()
    }

    /// Settles the core, dispatches every queued continuation and wakes
    /// every awaiting future.
    ///
    /// A second settlement is a silent no-op.
    pub(crate) fn settle(&self, outcome: Outcome) {
        let state = outcome.state();
        let settled = outcome.clone();

        let waiting = {
            let mut waiting = lock(&self.waiting);

            // The once-cell is the compare-and-set guarding the transition.
            if self.outcome.set(outcome).is_err() {
                tracing::debug!(state = ?self.state(), "ignoring settle on settled promise");
                return;
            }

            mem::take(&mut *waiting)
        };

        tracing::trace!(
            state = ?state,
            subscribers = waiting.subscribers.len(),
            "promise settled"
        );

        for subscriber in waiting.subscribers {
            self.dispatch(subscriber, settled.clone());
        }

        for waker in waiting.wakers {
            waker.wake();
        }
    }

    /// Registers a continuation.
    ///
    /// If the core has already settled, the continuation is scheduled right
    /// away; either way it runs after this call returns.
    pub(crate) fn subscribe(&self, subscriber: Subscriber) {
        let outcome = {
            let mut waiting = lock(&self.waiting);

            match self.outcome.get() {
                Some(outcome) => outcome.clone(),
                None => {
                    waiting.subscribers.push(subscriber);
                    tracing::trace!(queued = waiting.subscribers.len(), "continuation queued");
                    return;
                }
            }
        };

        self.dispatch(subscriber, outcome);
    }

    /// Registers a waker to be woken on settlement.
    ///
    /// Returns the outcome instead if the core has already settled. Waking
    /// runs no promise code, so it needs no scheduler turn.
    pub(crate) fn register_waker(&self, waker: &Waker) -> Option<Outcome> {
        let mut waiting = lock(&self.waiting);

        match self.outcome.get() {
            Some(outcome) => Some(outcome.clone()),
            None => {
                if !waiting.wakers.iter().any(|w| w.will_wake(waker)) {
                    waiting.wakers.push(waker.clone());
                }
                None
            }
        }
    }

    fn dispatch(&self, subscriber: Subscriber, outcome: Outcome) {
        self.scheduler.schedule(Box::new(move || subscriber.run(outcome)));
    }
}
