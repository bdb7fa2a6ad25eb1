use std::any::Any;
use thiserror::Error;

/// Faults raised by the promise machinery itself.
///
/// Errors never escape through a Rust `Result` on the public surface: they
/// are wrapped in [`Value::Error`](crate::Value::Error) and delivered as the
/// rejection reason of the promise they concern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A promise was resolved with itself, directly or through a handler.
    #[error("TypeError: a promise cannot be resolved with itself")]
    SelfResolution,

    /// A handler or producer panicked instead of returning.
    #[error("Panic: {0}")]
    Panicked(String),

    /// A user-raised fault, e.g. `Error::new("RangeError", "out of bounds")`.
    #[error("{name}: {message}")]
    Thrown { name: String, message: String },

    /// The event loop has shut down and no longer accepts jobs.
    #[error("event loop has shut down")]
    SchedulerGone,

    /// A job was scheduled on an event loop handle from outside the loop
    /// thread.
    #[error("job scheduled from outside the event loop thread")]
    ForeignThread,
}

impl Error {
    /// Creates a user fault with the given kind name and message.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Thrown {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The kind name of the fault (`TypeError`, `RangeError`, ...).
    pub fn name(&self) -> &str {
        match self {
            Self::SelfResolution => "TypeError",
            Self::Panicked(_) => "Panic",
            Self::Thrown { name, .. } => name,
            Self::SchedulerGone => "SchedulerGone",
            Self::ForeignThread => "ForeignThread",
        }
    }

    /// The human readable message, without the kind prefix.
    pub fn message(&self) -> String {
        match self {
            Self::SelfResolution => "a promise cannot be resolved with itself".to_string(),
            Self::Panicked(message) => message.clone(),
            Self::Thrown { message, .. } => message.clone(),
            Self::SchedulerGone => "event loop has shut down".to_string(),
            Self::ForeignThread => "job scheduled from outside the event loop thread".to_string(),
        }
    }

    /// Whether this fault is a `TypeError`, raised or user-constructed.
    pub fn is_type_error(&self) -> bool {
        self.name() == "TypeError"
    }

    /// Converts a panic payload into a fault.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "unknown panic payload".to_string(),
            },
        };

        Self::Panicked(message)
    }
}
