//! # fsa-thunk
//!
//! Thunk middleware for stores that dispatch Flux Standard Actions.
//!
//! An action whose payload is a [`Thunk`] is not forwarded down the chain.
//! Instead the middleware:
//!
//! 1. dispatches a copy of the action with its payload replaced by `null`,
//!    so the rest of the store can observe that the work started,
//! 2. calls the thunk with the store's `dispatch` and `get_state`,
//! 3. returns whatever the thunk returned.
//!
//! Actions that are not well-formed, or whose payload is plain data, pass
//! through to the next handler unchanged.
//!
//! ## Usage
//!
//! ```
//! use flux_action::Action;
//! use fsa_thunk::{fsa_thunk_middleware, Dispatcher, MiddlewareApi, Payload, StateReader};
//! use serde_json::json;
//!
//! let dispatch: Dispatcher<u32, Option<u32>> = Dispatcher::new(|_| None);
//! let get_state = StateReader::new(|| 3);
//! let reducer = Dispatcher::new(|_| Some(0));
//!
//! let handler = fsa_thunk_middleware(MiddlewareApi::new(dispatch, get_state))(reducer);
//!
//! let fetch = Action::new("FETCH_TODOS").with_payload(Payload::thunk(|dispatch, get_state| {
//!     dispatch.dispatch(Action::new("TODOS_LOADED").with_payload(Payload::Value(json!([]))));
//!     Some(get_state.get_state())
//! }));
//! assert_eq!(handler.dispatch(fetch), Some(3));
//! ```

pub mod dispatcher;
pub mod middleware;
pub mod payload;

pub use dispatcher::{Dispatcher, MiddlewareApi, Next, StateReader};
pub use middleware::{fsa_thunk_middleware, install, FsaThunkMiddleware, Middleware};
pub use payload::{lift, Payload, Thunk, ThunkAction};
