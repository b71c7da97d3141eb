//! Middleware for thunk-carrying actions
//!
//! Middleware sits between `dispatch` and the rest of the handler chain:
//!
//! ```text
//! store => next => action => result
//! ```
//!
//! [`FsaThunkMiddleware`] looks at every action. When it is a well-formed
//! Flux Standard Action whose payload is a [`Thunk`], the action is
//! announced to the store's `dispatch` with its payload replaced by `null`,
//! and the thunk is run with `dispatch` and `get_state`. Its result is
//! returned to the caller and `next` is never called. Every other action is
//! passed to `next` untouched.
//!
//! Nothing is caught: a thunk that panics, or returns an `Err` inside `R`,
//! surfaces that to whoever dispatched the action.

use crate::dispatcher::{Dispatcher, MiddlewareApi, Next};
use crate::payload::{Payload, Thunk, ThunkAction};
use flux_action::{FsaValidator, MessageValidator};
use std::sync::Arc;

/// Middleware trait - handles an action on its way through the chain
///
/// Middleware either answers the action itself or hands it to `next`.
pub trait Middleware<S, R>: Send + Sync {
    /// Handle an action
    ///
    /// - `action`: The action being dispatched
    /// - `next`: The rest of the chain
    ///
    /// Returns the chain's result for this action
    fn handle(&self, action: ThunkAction<S, R>, next: &Next<S, R>) -> R;
}

/// Wrap `next` with a middleware, producing the handler for the whole chain
pub fn install<S, R, M>(middleware: Arc<M>, next: Next<S, R>) -> Dispatcher<S, R>
where
    S: 'static,
    R: 'static,
    M: Middleware<S, R> + 'static,
{
    Dispatcher::new(move |action| middleware.handle(action, &next))
}

/// Runs thunk payloads instead of forwarding their actions
pub struct FsaThunkMiddleware<S, R, V = FsaValidator> {
    api: MiddlewareApi<S, R>,
    validator: V,
}

impl<S, R> FsaThunkMiddleware<S, R> {
    /// Create the middleware with the Flux Standard Action rules
    pub fn new(api: MiddlewareApi<S, R>) -> Self {
        Self::with_validator(api, FsaValidator::new())
    }
}

impl<S, R, V: MessageValidator> FsaThunkMiddleware<S, R, V> {
    /// Create the middleware with custom well-formedness rules
    pub fn with_validator(api: MiddlewareApi<S, R>, validator: V) -> Self {
        Self { api, validator }
    }

    /// The thunk to run for `action`, if the action is eligible
    ///
    /// Eligible means the validator accepts the action and its payload is a
    /// thunk.
    pub fn thunk_of<'a>(&self, action: &'a ThunkAction<S, R>) -> Option<&'a Thunk<S, R>> {
        match action.payload() {
            Some(Payload::Thunk(thunk)) if self.validator.is_valid(action) => Some(thunk),
            _ => None,
        }
    }

    /// Install in front of `next`
    pub fn install(self, next: Next<S, R>) -> Dispatcher<S, R>
    where
        S: 'static,
        R: 'static,
        V: 'static,
    {
        install(Arc::new(self), next)
    }
}

impl<S, R, V: MessageValidator> Middleware<S, R> for FsaThunkMiddleware<S, R, V> {
    fn handle(&self, action: ThunkAction<S, R>, next: &Next<S, R>) -> R {
        let Some(thunk) = self.thunk_of(&action).cloned() else {
            log::trace!(
                "FsaThunkMiddleware: passing {:?} to next",
                action.action_type()
            );
            return next.dispatch(action);
        };

        log::debug!(
            "FsaThunkMiddleware: running thunk for {:?}",
            action.action_type()
        );
        self.api.dispatch.dispatch(action.replace_payload(Payload::null()));
        thunk.call(&self.api.dispatch, &self.api.get_state)
    }
}

/// Build the middleware in its chain-installer form
///
/// ```
/// use flux_action::Action;
/// use fsa_thunk::{fsa_thunk_middleware, Dispatcher, MiddlewareApi, Payload, StateReader};
///
/// let api = MiddlewareApi::new(Dispatcher::new(|_| 0), StateReader::new(|| 41));
/// let handler = fsa_thunk_middleware(api)(Dispatcher::new(|_| -1));
///
/// let thunk = Action::new("ANSWER").with_payload(Payload::thunk(|_, state| state.get_state() + 1));
/// assert_eq!(handler.dispatch(thunk), 42);
/// assert_eq!(handler.dispatch(Action::new("PLAIN")), -1);
/// ```
pub fn fsa_thunk_middleware<S, R>(
    api: MiddlewareApi<S, R>,
) -> impl Fn(Next<S, R>) -> Dispatcher<S, R> + Send + Sync
where
    S: 'static,
    R: 'static,
{
    let middleware = Arc::new(FsaThunkMiddleware::new(api));
    move |next| install(Arc::clone(&middleware), next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::StateReader;
    use flux_action::{Action, FsaConfig};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    type State = u32;
    type Outcome = Option<String>;
    type TestAction = ThunkAction<State, Outcome>;

    /// Records every action a handler receives
    #[derive(Clone, Default)]
    struct Spy {
        calls: Arc<Mutex<Vec<TestAction>>>,
    }

    impl Spy {
        fn handler(&self, result: &str) -> Dispatcher<State, Outcome> {
            let calls = Arc::clone(&self.calls);
            let result = result.to_string();
            Dispatcher::new(move |action| {
                calls.lock().unwrap().push(action);
                Some(result.clone())
            })
        }

        fn calls(&self) -> Vec<TestAction> {
            self.calls.lock().unwrap().clone()
        }
    }

    struct Harness {
        dispatch_spy: Spy,
        next_spy: Spy,
        api: MiddlewareApi<State, Outcome>,
        handler: Dispatcher<State, Outcome>,
    }

    fn harness() -> Harness {
        let _ = env_logger::builder().is_test(true).try_init();

        let dispatch_spy = Spy::default();
        let next_spy = Spy::default();
        let api = MiddlewareApi::new(dispatch_spy.handler("dispatch"), StateReader::new(|| 7));
        let handler = fsa_thunk_middleware(api.clone())(next_spy.handler("next"));
        Harness {
            dispatch_spy,
            next_spy,
            api,
            handler,
        }
    }

    fn from_json(value: Value) -> TestAction {
        crate::lift(Action::<Value>::try_from(value).expect("test actions are objects"))
    }

    #[test]
    fn test_passes_non_fsa_actions() {
        let h = harness();
        let non_fsa = from_json(json!({"random": "stuff"}));

        let result = h.handler.dispatch(non_fsa.clone());

        assert_eq!(result, Some("next".to_string()));
        assert_eq!(h.next_spy.calls(), vec![non_fsa]);
        assert!(h.dispatch_spy.calls().is_empty());
    }

    #[test]
    fn test_passes_non_thunk_fsa_actions() {
        let h = harness();
        let without_payload: TestAction = Action::new("FSA_ACTION");
        let with_value = Action::new("FSA_ACTION").with_payload(Payload::Value(json!({"id": 1})));

        h.handler.dispatch(without_payload.clone());
        h.handler.dispatch(with_value.clone());

        assert_eq!(h.next_spy.calls(), vec![without_payload, with_value]);
        assert!(h.dispatch_spy.calls().is_empty());
    }

    #[test]
    fn test_passes_non_fsa_actions_even_with_thunk_payload() {
        let h = harness();
        let ran = Arc::new(Mutex::new(false));
        let ran_in_thunk = Arc::clone(&ran);
        let action: TestAction = Action::new("FSA_THUNK")
            .with_field("extra", json!(true))
            .with_payload(Payload::thunk(move |_, _| {
                *ran_in_thunk.lock().unwrap() = true;
                None
            }));

        h.handler.dispatch(action.clone());

        assert_eq!(h.next_spy.calls(), vec![action]);
        assert!(h.dispatch_spy.calls().is_empty());
        assert!(!*ran.lock().unwrap());
    }

    #[test]
    fn test_handles_thunk_fsa_actions() {
        let h = harness();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_thunk = Arc::clone(&seen);
        let expected_dispatch = h.api.dispatch.clone();
        let expected_state = h.api.get_state.clone();
        let action: TestAction = Action::new("FSA_THUNK").with_payload(Payload::thunk(
            move |dispatch, get_state| {
                seen_in_thunk.lock().unwrap().push((
                    dispatch.ptr_eq(&expected_dispatch),
                    get_state.ptr_eq(&expected_state),
                    get_state.get_state(),
                ));
                Some("thunk".to_string())
            },
        ));

        let result = h.handler.dispatch(action);

        // The thunk's result is returned, next is skipped
        assert_eq!(result, Some("thunk".to_string()));
        assert!(h.next_spy.calls().is_empty());

        // The action is announced once with a null payload
        let expected: TestAction = Action::new("FSA_THUNK").with_payload(Payload::null());
        assert_eq!(h.dispatch_spy.calls(), vec![expected]);

        // The thunk ran once with (dispatch, get_state)
        assert_eq!(*seen.lock().unwrap(), vec![(true, true, 7)]);
    }

    #[test]
    fn test_announced_action_keeps_other_fields() {
        let h = harness();
        let action: TestAction = Action::new("FSA_THUNK")
            .with_meta(json!({"source": "test"}))
            .with_error(false)
            .with_payload(Payload::thunk(|_, _| None));

        h.handler.dispatch(action.clone());

        let announced = h.dispatch_spy.calls();
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0].fields(), action.fields());
        assert_eq!(announced[0].payload(), Some(&Payload::null()));
    }

    #[test]
    fn test_thunk_can_dispatch_through_store() {
        let h = harness();
        let action: TestAction = Action::new("LOAD").with_payload(Payload::thunk(|dispatch, _| {
            dispatch.dispatch(Action::new("LOADED").with_payload(Payload::Value(json!(1))))
        }));

        let result = h.handler.dispatch(action);

        assert_eq!(result, Some("dispatch".to_string()));
        let types: Vec<_> = h
            .dispatch_spy
            .calls()
            .iter()
            .map(|a| a.action_type().map(str::to_string))
            .collect();
        assert_eq!(
            types,
            vec![Some("LOAD".to_string()), Some("LOADED".to_string())]
        );
    }

    #[test]
    fn test_exactly_one_of_dispatch_or_next() {
        let h = harness();
        let actions: Vec<TestAction> = vec![
            from_json(json!({"random": "stuff"})),
            from_json(json!({"type": "FSA_ACTION"})),
            from_json(json!({"type": "FSA_ACTION", "payload": null})),
            Action::new("FSA_THUNK").with_payload(Payload::thunk(|_, _| None)),
        ];

        for (i, action) in actions.into_iter().enumerate() {
            h.handler.dispatch(action);
            assert_eq!(h.dispatch_spy.calls().len() + h.next_spy.calls().len(), i + 1);
        }
        assert_eq!(h.dispatch_spy.calls().len(), 1);
        assert_eq!(h.next_spy.calls().len(), 3);
    }

    #[test]
    fn test_classification_is_repeatable() {
        let h = harness();
        let middleware = FsaThunkMiddleware::new(h.api.clone());
        let thunk: TestAction = Action::new("T").with_payload(Payload::thunk(|_, _| None));
        let plain: TestAction = Action::new("T");

        assert!(middleware.thunk_of(&thunk).is_some());
        assert!(middleware.thunk_of(&thunk).is_some());
        assert!(middleware.thunk_of(&plain).is_none());
        assert!(middleware.thunk_of(&plain).is_none());
    }

    #[test]
    fn test_custom_validator_from_config() -> anyhow::Result<()> {
        let h = harness();
        let config = FsaConfig::from_toml_str(r#"allowed_keys = ["type", "payload", "sequence"]"#)?;
        let middleware =
            FsaThunkMiddleware::with_validator(h.api.clone(), FsaValidator::from_config(&config));
        let handler = middleware.install(h.next_spy.handler("next"));

        let sequenced: TestAction = Action::new("T")
            .with_field("sequence", json!(1))
            .with_payload(Payload::thunk(|_, _| Some("thunk".to_string())));
        assert_eq!(handler.dispatch(sequenced), Some("thunk".to_string()));

        // `meta` is no longer allowed, so the thunk is forwarded
        let with_meta: TestAction = Action::new("T")
            .with_meta(json!({}))
            .with_payload(Payload::thunk(|_, _| Some("thunk".to_string())));
        assert_eq!(handler.dispatch(with_meta), Some("next".to_string()));
        Ok(())
    }

    #[test]
    fn test_thunk_errors_propagate() {
        let api: MiddlewareApi<State, Result<u32, String>> =
            MiddlewareApi::new(Dispatcher::new(|_| Ok(0)), StateReader::new(|| 0));
        let handler = fsa_thunk_middleware(api)(Dispatcher::new(|_| Ok(1)));

        let failing = Action::new("FAIL")
            .with_payload(Payload::thunk(|_, _| Err("request failed".to_string())));

        assert_eq!(handler.dispatch(failing), Err("request failed".to_string()));
    }

    #[test]
    #[should_panic(expected = "thunk exploded")]
    fn test_thunk_panics_propagate() {
        let h = harness();
        let action: TestAction =
            Action::new("BOOM").with_payload(Payload::thunk(|_, _| panic!("thunk exploded")));
        h.handler.dispatch(action);
    }
}
