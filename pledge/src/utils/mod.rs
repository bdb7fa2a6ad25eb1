//! Small internal helpers shared by the promise core and the schedulers.

use crate::error::Error;
use crate::value::Value;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the guard if a previous holder panicked.
///
/// Every critical section in the crate leaves its data consistent before
/// running user code, so a poisoned lock carries no broken invariant.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs user code, turning a panic into a rejection reason.
///
/// Returned `Err` values pass through untouched, so callers see a single
/// "threw" path regardless of how the fault was raised.
pub(crate) fn catch_fault<T>(f: impl FnOnce() -> Result<T, Value>) -> Result<T, Value> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Error::from_panic(payload).into()))
}
