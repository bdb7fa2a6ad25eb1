//! Values flowing through promise chains.
//!
//! Promise chains are dynamically typed: a handler may return a plain value,
//! another promise, or a foreign object that happens to expose a `then`
//! capability. [`Value`] is the closed set of shapes a result can take, and
//! [`Object`] is the interop boundary foreign promise implementations plug
//! into.

use crate::error::Error;
use crate::promise::Promise;

use std::fmt;
use std::sync::Arc;

/// The `then` member of a foreign object.
///
/// Invoked with the object itself as receiver and two callbacks. Returning
/// `Err` means the invocation threw.
pub type ThenFn = Arc<dyn Fn(&Value, Callback, Callback) -> Result<(), Value> + Send + Sync>;

/// A resolve or reject callback handed to a foreign `then`.
///
/// Foreign code may call it any number of times; only the first call made
/// during a resolution attempt has an effect.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(Value) + Send + Sync>);

impl Callback {
    /// Wraps a closure as a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invokes the callback with `value`.
    pub fn call(&self, value: impl Into<Value>) {
        (self.0)(value.into())
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// A foreign object taking part in promise resolution.
///
/// Any type may implement this. The default implementation has no `then`
/// member, so the object is adopted as a plain fulfillment value.
pub trait Object: Send + Sync {
    /// Reads the `then` member.
    ///
    /// - `Ok(Some(then))`: the object is thenable.
    /// - `Ok(None)`: there is no callable `then`.
    /// - `Err(reason)`: reading the member faulted.
    fn then(&self) -> Result<Option<ThenFn>, Value> {
        Ok(None)
    }
}

/// A ready-made thenable wrapping a closure as its `then` member.
pub struct Thenable {
    then: ThenFn,
}

impl Thenable {
    /// Creates a thenable whose `then` member is the closure.
    pub fn new<F>(then: F) -> Self
    where
        F: Fn(&Value, Callback, Callback) -> Result<(), Value> + Send + Sync + 'static,
    {
        Self {
            then: Arc::new(then),
        }
    }
}

impl Object for Thenable {
    fn then(&self) -> Result<Option<ThenFn>, Value> {
        Ok(Some(self.then.clone()))
    }
}

/// A fulfillment value or rejection reason.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Error(Arc<Error>),
    Promise(Promise),
    Object(Arc<dyn Object>),
}

impl Value {
    /// Wraps a foreign object.
    pub fn object(object: impl Object + 'static) -> Self {
        Self::Object(Arc::new(object))
    }

    /// Same-instance comparison.
    ///
    /// Reference variants compare by identity, primitives by value. Unlike
    /// `==` on `f64`, `NaN` is the same as itself.
    pub fn same(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => Arc::ptr_eq(a, b),
            (Self::Promise(a), Self::Promise(b)) => Promise::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Whether this is [`Value::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The number, if this is a [`Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The error, if this is a [`Value::Error`].
    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    /// The promise, if this is a [`Value::Promise`].
    pub fn as_promise(&self) -> Option<&Promise> {
        match self {
            Self::Promise(p) => Some(p),
            _ => None,
        }
    }
}

/// Structural equality for primitives and errors, identity for promises and
/// objects. Use [`Value::same`] when instance identity matters.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a == b,
            _ => Value::same(self, other),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Self::Promise(p) => f.debug_tuple("Promise").field(p).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Undefined
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s))
    }
}

impl From<Error> for Value {
    fn from(e: Error) -> Self {
        Self::Error(Arc::new(e))
    }
}

impl From<Promise> for Value {
    fn from(p: Promise) -> Self {
        Self::Promise(p)
    }
}
