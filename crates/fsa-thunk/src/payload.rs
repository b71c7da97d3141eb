//! Action payloads: plain data or a thunk

use crate::dispatcher::{Dispatcher, StateReader};
use flux_action::Action;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// An action whose payload may carry a thunk
pub type ThunkAction<S, R> = Action<Payload<S, R>>;

type ThunkFn<S, R> = dyn Fn(&Dispatcher<S, R>, &StateReader<S>) -> R + Send + Sync;

/// Deferred computation carried in an action's payload
///
/// Called with the store's `dispatch` and `get_state`, in that order. What
/// it returns is opaque to the middleware and handed back to the caller of
/// `dispatch`.
pub struct Thunk<S, R> {
    f: Arc<ThunkFn<S, R>>,
}

impl<S, R> Thunk<S, R> {
    pub fn new(f: impl Fn(&Dispatcher<S, R>, &StateReader<S>) -> R + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    pub fn call(&self, dispatch: &Dispatcher<S, R>, get_state: &StateReader<S>) -> R {
        (self.f)(dispatch, get_state)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.f), Arc::as_ptr(&other.f))
    }
}

impl<S, R> Clone for Thunk<S, R> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<S, R> fmt::Debug for Thunk<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk(..)")
    }
}

/// Payload of a [`ThunkAction`]
pub enum Payload<S, R> {
    /// Plain data
    Value(Value),
    /// A callable to run instead of forwarding the action
    Thunk(Thunk<S, R>),
}

impl<S, R> Payload<S, R> {
    /// The marker that replaces a thunk before its action is announced
    pub fn null() -> Self {
        Payload::Value(Value::Null)
    }

    pub fn thunk(f: impl Fn(&Dispatcher<S, R>, &StateReader<S>) -> R + Send + Sync + 'static) -> Self {
        Payload::Thunk(Thunk::new(f))
    }

    pub fn is_thunk(&self) -> bool {
        matches!(self, Payload::Thunk(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Payload::Value(value) => Some(value),
            Payload::Thunk(_) => None,
        }
    }

    pub fn as_thunk(&self) -> Option<&Thunk<S, R>> {
        match self {
            Payload::Thunk(thunk) => Some(thunk),
            Payload::Value(_) => None,
        }
    }
}

impl<S, R> From<Value> for Payload<S, R> {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

impl<S, R> From<Thunk<S, R>> for Payload<S, R> {
    fn from(thunk: Thunk<S, R>) -> Self {
        Payload::Thunk(thunk)
    }
}

impl<S, R> Clone for Payload<S, R> {
    fn clone(&self) -> Self {
        match self {
            Payload::Value(value) => Payload::Value(value.clone()),
            Payload::Thunk(thunk) => Payload::Thunk(thunk.clone()),
        }
    }
}

impl<S, R> fmt::Debug for Payload<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Payload::Thunk(thunk) => thunk.fmt(f),
        }
    }
}

/// Values compare by content, thunks by identity
impl<S, R> PartialEq for Payload<S, R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Payload::Value(a), Payload::Value(b)) => a == b,
            (Payload::Thunk(a), Payload::Thunk(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Lift a plain JSON action into one that can flow through a thunk-aware chain
pub fn lift<S, R>(action: Action<Value>) -> ThunkAction<S, R> {
    action.map_payload(Payload::Value)
}
