use crate::value::Value;

/// Observable state of a promise.
///
/// Transitions happen at most once, from `Pending` to one of the two
/// settled states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// No result yet.
    Pending,

    /// Holds a fulfillment value.
    Fulfilled,

    /// Holds a rejection reason.
    Rejected,
}

impl State {
    /// Returns `true` once the promise has left `Pending`.
    pub fn is_settled(self) -> bool {
        self != State::Pending
    }
}

/// A settled result, tagged with how it settled.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Fulfilled(Value),
    Rejected(Value),
}

impl Outcome {
    pub(crate) fn state(&self) -> State {
        match self {
            Outcome::Fulfilled(_) => State::Fulfilled,
            Outcome::Rejected(_) => State::Rejected,
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Outcome::Fulfilled(value) | Outcome::Rejected(value) => value,
        }
    }

    pub(crate) fn into_result(self) -> Result<Value, Value> {
        match self {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(reason) => Err(reason),
        }
    }
}
