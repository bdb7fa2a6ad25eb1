use super::Promise;
use super::core::Core;
use super::resolve::resolve;
use super::state::Outcome;
use crate::scheduler::Scheduler;
use crate::value::Value;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A promise together with the capability to settle it.
///
/// The `promise` half can be shared freely with consumers; only holders of
/// the `settler` can move it out of the pending state.
pub struct Deferred {
    pub promise: Promise,
    pub settler: Settler,
}

impl Deferred {
    /// Creates a pending promise whose continuations run on `scheduler`.
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        let core = Arc::new(Core::new(scheduler));

        Self {
            promise: Promise { core: core.clone() },
            settler: Settler { core },
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("promise", &self.promise)
            .finish_non_exhaustive()
    }
}

/// The settle-side capability of a [`Deferred`].
///
/// `fulfill` and `reject` settle directly. `resolve` goes through the
/// resolution procedure, adopting the state of promises and thenables.
/// Calls after the promise has settled have no effect.
#[derive(Clone)]
pub struct Settler {
    core: Arc<Core>,
}

impl Settler {
    /// Fulfills the promise with `value` as is, without following thenables.
    pub fn fulfill(&self, value: impl Into<Value>) {
        self.settle(Outcome::Fulfilled(value.into()));
    }

    /// Rejects the promise with `reason`.
    pub fn reject(&self, reason: impl Into<Value>) {
        self.settle(Outcome::Rejected(reason.into()));
    }

    /// Resolves with `x`, following it if it is a promise or thenable.
    pub fn resolve(&self, x: impl Into<Value>) {
        resolve(self, x.into());
    }

    /// Whether this settler controls `promise`.
    pub(crate) fn controls(&self, promise: &Promise) -> bool {
        Arc::ptr_eq(&self.core, &promise.core)
    }

    pub(crate) fn settle(&self, outcome: Outcome) {
        self.core.settle(outcome);
    }

    /// The scheduler continuations of this promise run on.
    pub(crate) fn scheduler(&self) -> Arc<dyn Scheduler> {
        self.core.scheduler()
    }
}

impl fmt::Debug for Settler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler")
            .field("state", &self.core.state())
            .finish()
    }
}

/// The capabilities handed to a producer by [`Promise::new`].
///
/// Only the first call to either method counts: once the producer has
/// resolved (even with a still-pending thenable) or rejected, later calls
/// are ignored.
#[derive(Clone)]
pub struct Resolvers {
    settler: Settler,

    /// Shared "already resolved" flag.
    used: Arc<AtomicBool>,
}

impl Resolvers {
    /// Creates a new set of unused capabilities for `settler`.
    pub(crate) fn new(settler: Settler) -> Self {
        Self {
            settler,
            used: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Resolves the promise with `x`, following promises and thenables.
    pub fn resolve(&self, x: impl Into<Value>) {
        if self.claim() {
            self.settler.resolve(x);
        }
    }

    /// Rejects the promise with `reason`.
    pub fn reject(&self, reason: impl Into<Value>) {
        if self.claim() {
            self.settler.reject(reason);
        }
    }

    fn claim(&self) -> bool {
        !self.used.swap(true, Ordering::AcqRel)
    }
}

impl fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolvers")
            .field("used", &self.used.load(Ordering::Acquire))
            .finish()
    }
}
