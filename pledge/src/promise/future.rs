use super::Promise;
use crate::value::Value;

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future resolving once a promise settles.
///
/// Created by `promise.await` / [`IntoFuture`]. Resolves to `Ok(value)` on
/// fulfillment and `Err(reason)` on rejection. Dropping the future does not
/// affect the promise.
///
/// The future registers its waker directly with the promise instead of
/// chaining a continuation, so it may be polled from any thread and never
/// schedules work of its own.
pub struct PromiseFuture {
    promise: Promise,
}

impl Future for PromiseFuture {
    type Output = Result<Value, Value>;

    /// Polls the promise.
    ///
    /// The outcome check and the waker registration happen under the same
    /// lock as settlement, so a settlement racing with the poll is never
    /// missed.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.promise.core.register_waker(cx.waker()) {
            Some(outcome) => Poll::Ready(outcome.into_result()),
            None => Poll::Pending,
        }
    }
}

impl IntoFuture for Promise {
    type Output = Result<Value, Value>;
    type IntoFuture = PromiseFuture;

    /// Creates a new future awaiting this promise.
    fn into_future(self) -> PromiseFuture {
        PromiseFuture { promise: self }
    }
}
