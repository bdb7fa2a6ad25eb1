use super::Promise;
use super::core::handler;
use super::deferred::Settler;
use crate::error::Error;
use crate::utils::catch_fault;
use crate::value::{Callback, ThenFn, Value};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-attempt guard against thenables that call back more than once.
#[derive(Default)]
struct ResolutionContext {
    settled: AtomicBool,
}

impl ResolutionContext {
    /// Returns `true` for the first signal of this attempt only.
    fn claim(&self) -> bool {
        !self.settled.swap(true, Ordering::AcqRel)
    }
}

/// What a thenable candidate is followed through.
enum Follow {
    Own(Promise),
    Foreign(ThenFn),
}

/// Settles the promise behind `settler` with the candidate result `x`.
///
/// - `x` is the promise itself: reject with a type fault.
/// - `x` is a promise or an object with a callable `then`: follow it.
/// - anything else: fulfill with `x`.
///
/// Faults while reading or calling `then` reject the promise, unless one of
/// the callbacks already fired.
pub(crate) fn resolve(settler: &Settler, x: Value) {
    let follow = match &x {
        Value::Promise(promise) if settler.controls(promise) => {
            settler.reject(Error::SelfResolution);
            return;
        }
        Value::Promise(promise) => Follow::Own(promise.clone()),
        Value::Object(object) => match catch_fault(|| object.then()) {
            Ok(Some(then)) => Follow::Foreign(then),
            Ok(None) => {
                settler.fulfill(x.clone());
                return;
            }
            Err(reason) => {
                settler.reject(reason);
                return;
            }
        },
        _ => {
            settler.fulfill(x.clone());
            return;
        }
    };

    let context = Arc::new(ResolutionContext::default());

    let on_fulfilled = {
        let settler = settler.clone();
        let context = context.clone();

        Callback::new(move |value| {
            if context.claim() {
                // Synchronous thenables would otherwise recurse once per
                // nesting level; a job keeps the stack flat.
                let next = settler.clone();
                settler
                    .scheduler()
                    .schedule(Box::new(move || resolve(&next, value)));
            } else {
                tracing::debug!("ignoring repeated thenable callback");
            }
        })
    };

    let on_rejected = {
        let settler = settler.clone();
        let context = context.clone();

        Callback::new(move |reason| {
            if context.claim() {
                settler.reject(reason);
            } else {
                tracing::debug!("ignoring repeated thenable callback");
            }
        })
    };

    let invoked = match follow {
        Follow::Own(promise) => {
            adopt(&promise, on_fulfilled, on_rejected);
            Ok(())
        }
        Follow::Foreign(then) => catch_fault(|| then(&x, on_fulfilled, on_rejected)),
    };

    if let Err(reason) = invoked {
        if context.claim() {
            settler.reject(reason);
        } else {
            tracing::debug!("swallowing fault from a thenable that already called back");
        }
    }
}

/// Follows one of our own promises through its regular `then`.
fn adopt(promise: &Promise, on_fulfilled: Callback, on_rejected: Callback) {
    promise.then(
        Some(handler(move |value| {
            on_fulfilled.call(value);
            Ok(Value::Undefined)
        })),
        Some(handler(move |reason| {
            on_rejected.call(reason);
            Ok(Value::Undefined)
        })),
    );
}
