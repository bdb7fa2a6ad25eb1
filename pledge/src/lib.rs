//! # Pledge
//!
//! **Pledge** is a deferred-value primitive following the Promises/A+
//! contract: a [`Promise`] stands for the eventual result of an operation,
//! and [`Promise::then`] composes continuations into new promises.
//!
//! The crate provides:
//!
//! - A **settle-once state machine** with a continuation queue drained exactly
//!   once, on settlement
//! - The **resolution procedure**, which follows nested promises and foreign
//!   thenables instead of settling with them
//! - **Strict deferral**: continuations always run through an injected
//!   [`Scheduler`], never inside the call that registered or triggered them
//! - Two schedulers: a caller-driven [`MicrotaskQueue`] and a threaded
//!   [`EventLoop`]
//! - An **`async` bridge**: every promise can be `.await`ed
//!
//! ## Quick Start
//!
//! ```rust
//! use pledge::{Deferred, Error, MicrotaskQueue, Value, handler};
//! use std::sync::Arc;
//!
//! let queue = Arc::new(MicrotaskQueue::new());
//! let deferred = Deferred::new(queue.clone());
//!
//! let message = deferred
//!     .promise
//!     .then(None, Some(handler(|reason| {
//!         let message = reason.as_error().map(Error::message).unwrap_or_default();
//!         Ok(Value::from(message))
//!     })));
//!
//! deferred.settler.reject(Error::new("Error", "boom"));
//! queue.run_until_idle();
//!
//! assert_eq!(message.outcome(), Some(Ok(Value::from("boom"))));
//! ```
//!
//! ## Interop
//!
//! Foreign promise implementations take part through the [`Object`] trait:
//! any object exposing a callable `then` is followed by the resolution
//! procedure. [`Thenable`] wraps a closure for the common case.

mod error;
mod promise;
mod scheduler;
mod utils;
mod value;

pub use error::Error;
pub use promise::{
    Deferred, Handler, Promise, PromiseFuture, Resolvers, Settler, State, handler,
};
pub use scheduler::{EventLoop, EventLoopBuilder, Job, MicrotaskQueue, Scheduler};
pub use value::{Callback, Object, ThenFn, Thenable, Value};
