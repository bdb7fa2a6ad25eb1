use super::EventLoop;

use std::io;
use std::time::Duration;

/// Builder for configuring and creating an [`EventLoop`].
///
/// # Examples
///
/// ```rust
/// use pledge::EventLoopBuilder;
/// use std::time::Duration;
///
/// let event_loop = EventLoopBuilder::new()
///     .thread_name("promise-jobs")
///     .park_timeout(Duration::from_millis(5))
///     .build()
///     .expect("spawn event loop thread");
/// # drop(event_loop);
/// ```
pub struct EventLoopBuilder {
    /// Name given to the loop thread.
    thread_name: String,

    /// Upper bound on how long the idle thread sleeps between checks.
    park_timeout: Duration,
}

impl EventLoopBuilder {
    /// Creates a builder with the default thread name and a 10ms park
    /// timeout.
    pub fn new() -> Self {
        Self {
            thread_name: "pledge-event-loop".to_string(),
            park_timeout: Duration::from_millis(10),
        }
    }

    /// Sets the name of the loop thread.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Sets the idle park interval.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero.
    pub fn park_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "park_timeout must be > 0");

        self.park_timeout = timeout;
        self
    }

    /// Spawns the loop thread.
    ///
    /// Fails only if the operating system refuses to create the thread.
    pub fn build(self) -> io::Result<EventLoop> {
        EventLoop::start(self.thread_name, self.park_timeout)
    }
}

impl Default for EventLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
