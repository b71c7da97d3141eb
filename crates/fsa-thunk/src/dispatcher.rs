//! Store capabilities handed to middleware
//!
//! A store exposes two capabilities to its middleware: dispatching an action
//! back into the chain ([`Dispatcher`]) and reading the current state
//! ([`StateReader`]). Both are cheap to clone and can be moved into spawned
//! tasks, so a thunk can keep dispatching after it returns.

use crate::payload::ThunkAction;
use std::fmt;
use std::sync::Arc;

type DispatchFn<S, R> = dyn Fn(ThunkAction<S, R>) -> R + Send + Sync;
type GetStateFn<S> = dyn Fn() -> S + Send + Sync;

/// Handler that accepts an action and returns the chain's result
///
/// Used both for the store's `dispatch` and for the next handler in a
/// middleware chain.
pub struct Dispatcher<S, R> {
    handler: Arc<DispatchFn<S, R>>,
}

/// The next handler in a middleware chain
pub type Next<S, R> = Dispatcher<S, R>;

impl<S, R> Dispatcher<S, R> {
    pub fn new(handler: impl Fn(ThunkAction<S, R>) -> R + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Dispatch an action and return whatever the handler returns
    pub fn dispatch(&self, action: ThunkAction<S, R>) -> R {
        (self.handler)(action)
    }

    /// `true` when both dispatchers share the same handler
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.handler), Arc::as_ptr(&other.handler))
    }
}

impl<S, R> Clone for Dispatcher<S, R> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<S, R> fmt::Debug for Dispatcher<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

/// Reads a snapshot of the store's current state
pub struct StateReader<S> {
    reader: Arc<GetStateFn<S>>,
}

impl<S> StateReader<S> {
    pub fn new(reader: impl Fn() -> S + Send + Sync + 'static) -> Self {
        Self {
            reader: Arc::new(reader),
        }
    }

    pub fn get_state(&self) -> S {
        (self.reader)()
    }

    /// `true` when both readers share the same function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.reader), Arc::as_ptr(&other.reader))
    }
}

impl<S> Clone for StateReader<S> {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
        }
    }
}

impl<S> fmt::Debug for StateReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateReader").finish_non_exhaustive()
    }
}

/// The store capabilities a middleware is constructed with
pub struct MiddlewareApi<S, R> {
    pub dispatch: Dispatcher<S, R>,
    pub get_state: StateReader<S>,
}

impl<S, R> MiddlewareApi<S, R> {
    pub fn new(dispatch: Dispatcher<S, R>, get_state: StateReader<S>) -> Self {
        Self {
            dispatch,
            get_state,
        }
    }
}

impl<S, R> Clone for MiddlewareApi<S, R> {
    fn clone(&self) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            get_state: self.get_state.clone(),
        }
    }
}

impl<S, R> fmt::Debug for MiddlewareApi<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareApi")
            .field("dispatch", &self.dispatch)
            .field("get_state", &self.get_state)
            .finish()
    }
}
