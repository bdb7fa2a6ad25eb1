use pledge::{Deferred, EventLoop, EventLoopBuilder, MicrotaskQueue, Promise, Value, handler};
use tracing_subscriber::EnvFilter;

use std::future::{Future, IntoFuture};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::task::{Context, Poll, Wake, Waker};
use std::thread::{self, Thread};
use std::time::Duration;

/// Routes library logs to the test output; filter with `RUST_LOG`.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wakes the thread blocked in [`block_on`].
struct ThreadWaker(Thread);

impl Wake for ThreadWaker {
    fn wake(self: Arc<Self>) {
        self.0.unpark();
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    let waker = Waker::from(Arc::new(ThreadWaker(thread::current())));
    let mut cx = Context::from_waker(&waker);
    let mut future = pin!(future);

    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
        thread::park_timeout(Duration::from_millis(50));
    }
}

#[test]
fn test_handlers_run_on_loop_thread() {
    init_logging();

    let event_loop = EventLoopBuilder::new()
        .thread_name("promise-test-loop")
        .build()
        .unwrap();
    let handle = event_loop.handle();
    let (tx, rx) = mpsc::channel();

    event_loop
        .spawn(Box::new(move || {
            let deferred = Deferred::new(handle);

            deferred.promise.then(
                Some(handler(move |v| {
                    let name = thread::current().name().map(str::to_string);
                    tx.send((name, v.clone())).unwrap();
                    Ok(v)
                })),
                None,
            );
            deferred.settler.fulfill(3);
        }))
        .unwrap();

    let (name, value) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(name.as_deref(), Some("promise-test-loop"));
    assert_eq!(value, Value::from(3));
}

#[test]
fn test_chain_built_on_loop_is_awaited_elsewhere() {
    let event_loop = EventLoop::new().unwrap();
    let handle = event_loop.handle();
    let (tx, rx) = mpsc::channel();

    event_loop
        .spawn(Box::new(move || {
            let deferred = Deferred::new(handle);
            let chained = deferred
                .promise
                .then(Some(handler(|v| Ok(Value::from(v.as_number().unwrap() + 1.0)))), None)
                .then(Some(handler(|v| Ok(Value::from(v.as_number().unwrap() * 10.0)))), None);

            tx.send(chained).unwrap();
            deferred.settler.resolve(4);
        }))
        .unwrap();

    let chained = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(block_on(chained.into_future()), Ok(Value::from(50)));
}

#[test]
fn test_then_on_settled_promise_returns_before_handler_runs() {
    let event_loop = EventLoop::new().unwrap();
    let handle = event_loop.handle();
    let (tx, rx) = mpsc::channel();

    event_loop
        .spawn(Box::new(move || {
            let promise = Promise::resolved(handle, 1);

            for _ in 0..200 {
                let returned = Arc::new(AtomicBool::new(false));
                let (seen, tx) = (returned.clone(), tx.clone());

                promise.then(
                    Some(handler(move |v| {
                        tx.send(seen.load(Ordering::SeqCst)).unwrap();
                        Ok(v)
                    })),
                    None,
                );
                returned.store(true, Ordering::SeqCst);
            }
        }))
        .unwrap();

    let seen: Vec<bool> = (0..200)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    assert!(seen.iter().all(|&returned| returned));
}

#[test]
fn test_then_from_foreign_thread_is_refused() {
    init_logging();

    let event_loop = EventLoop::new().unwrap();
    let promise = Promise::resolved(event_loop.handle(), 1);
    let called = Arc::new(AtomicBool::new(false));

    let c = called.clone();
    let next = promise.then(
        Some(handler(move |v| {
            c.store(true, Ordering::SeqCst);
            Ok(v)
        })),
        None,
    );

    // Anything the loop accepted before this job has run once it replies.
    let (tx, rx) = mpsc::channel();
    event_loop.spawn(Box::new(move || tx.send(()).unwrap())).unwrap();
    rx.recv_timeout(Duration::from_secs(5)).unwrap();

    assert!(!called.load(Ordering::SeqCst));
    assert!(next.outcome().is_none());
}

#[test]
fn test_continuation_accepted_before_shutdown_still_runs() {
    init_logging();

    let mut event_loop = EventLoop::new().unwrap();
    let handle = event_loop.handle();
    let (ready_tx, ready_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (tx, rx) = mpsc::channel();

    event_loop
        .spawn(Box::new(move || {
            let deferred = Deferred::new(handle);

            deferred.promise.then(
                Some(handler(move |v| {
                    tx.send(v.clone()).unwrap();
                    Ok(v)
                })),
                None,
            );
            deferred.settler.fulfill("drained");

            ready_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        }))
        .unwrap();

    ready_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let releaser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        release_tx.send(()).unwrap();
    });

    event_loop.shutdown();
    releaser.join().unwrap();

    assert_eq!(rx.try_recv(), Ok(Value::from("drained")));
}

#[test]
fn test_await_rejection() {
    let event_loop = EventLoop::new().unwrap();
    let promise = Promise::rejected(event_loop.handle(), "refused");

    let outcome = block_on(async move { promise.await });

    assert_eq!(outcome, Err(Value::from("refused")));
}

#[test]
fn test_await_settled_promise_needs_no_scheduler_run() {
    let queue = Arc::new(MicrotaskQueue::new());
    let promise = Promise::resolved(queue.clone(), "ready");

    assert_eq!(block_on(promise.into_future()), Ok(Value::from("ready")));
    assert!(queue.is_empty());
}

#[test]
fn test_await_pending_promise_with_microtasks() {
    let queue = Arc::new(MicrotaskQueue::new());
    let deferred = Deferred::new(queue.clone());
    let waker = Waker::from(Arc::new(ThreadWaker(thread::current())));
    let mut cx = Context::from_waker(&waker);

    let mut future = pin!(deferred.promise.clone().into_future());
    assert!(future.as_mut().poll(&mut cx).is_pending());

    deferred.settler.fulfill("woken");
    queue.run_until_idle();

    assert_eq!(
        future.as_mut().poll(&mut cx),
        Poll::Ready(Ok(Value::from("woken")))
    );
}

#[test]
fn test_settling_after_shutdown_leaves_continuation_pending() {
    init_logging();

    let mut event_loop = EventLoop::new().unwrap();
    let deferred = Deferred::new(event_loop.handle());
    let next = deferred.promise.then(None, None);

    event_loop.shutdown();
    deferred.settler.fulfill(1);

    assert!(next.outcome().is_none());
}
