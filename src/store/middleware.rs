//! Standard Middleware
//!
//! Composable dispatch interceptors. Order matters: the first middleware in a
//! store's list sees every dispatch first and wraps all the others.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::PortalError;
use crate::external::{ErrorRecord, ErrorReporter, Persistence};
use crate::store::{Action, Dispatch, DispatchFn, Middleware, StoreApi};

// == Thunk ==
/// Runs [`Dispatch::Thunk`] values with the store API instead of forwarding them.
pub fn thunk<S, A>() -> Middleware<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    Arc::new(|api: StoreApi<S, A>, next: DispatchFn<S, A>| -> DispatchFn<S, A> {
        Arc::new(move |dispatch| match dispatch {
            Dispatch::Thunk(thunk) => thunk(&api),
            action => next(action),
        })
    })
}

// == Logging ==
/// Logs the previous state, the action and the next state around `next`.
pub fn logging<S, A>() -> Middleware<S, A>
where
    S: Debug + Send + Sync + 'static,
    A: Action,
{
    Arc::new(|api: StoreApi<S, A>, next: DispatchFn<S, A>| -> DispatchFn<S, A> {
        Arc::new(move |dispatch| {
            let prev = api.get_state().ok();
            debug!(store = api.name(), action = ?dispatch, prev = ?prev, "dispatching");
            let result = next(dispatch);
            let state = api.get_state().ok();
            debug!(store = api.name(), next = ?state, ok = result.is_ok(), "dispatched");
            result
        })
    })
}

// == Error Boundary ==
/// Reports any failure further down the chain, then returns it unchanged.
pub fn error_boundary<S, A>() -> Middleware<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    Arc::new(|api: StoreApi<S, A>, next: DispatchFn<S, A>| -> DispatchFn<S, A> {
        Arc::new(move |dispatch| {
            let kind = dispatch.kind();
            next(dispatch).map_err(|err| {
                api.reporter().report(
                    ErrorRecord::from_error(&err)
                        .with_context(json!({
                            "store": api.name(),
                            "action": kind,
                            "boundary": true,
                        }))
                        .handled(false),
                );
                err
            })
        })
    })
}

// == Validation ==
/// Payload check for one action kind. Returning false rejects the dispatch.
pub type Validator<A> = Arc<dyn Fn(&A) -> bool + Send + Sync>;

/// Validators keyed by action kind.
pub struct Validators<A> {
    rules: HashMap<&'static str, Validator<A>>,
}

impl<A> Default for Validators<A> {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }
}

impl<A: Action> Validators<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<F>(mut self, kind: &'static str, validator: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.rules.insert(kind, Arc::new(validator));
        self
    }

    /// Returns false if a rule exists for the action's kind and rejects it.
    pub fn check(&self, action: &A) -> bool {
        self.rules
            .get(action.kind())
            .map_or(true, |validator| validator(action))
    }
}

/// Rejects actions whose registered validator returns false, before the reducer runs.
pub fn validation<S, A>(validators: Validators<A>) -> Middleware<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    let validators = Arc::new(validators);
    Arc::new(move |_api: StoreApi<S, A>, next: DispatchFn<S, A>| -> DispatchFn<S, A> {
        let validators = validators.clone();
        Arc::new(move |dispatch| {
            if let Some(action) = dispatch.as_action() {
                if !validators.check(action) {
                    return Err(PortalError::InvalidPayload(action.kind().to_string()));
                }
            }
            next(dispatch)
        })
    })
}

// == Persistence ==
/// After a successful dispatch, writes the whole state as JSON under `key`.
///
/// Write failures are reported and swallowed.
pub fn persistence<S, A>(key: impl Into<String>, backend: Arc<dyn Persistence>) -> Middleware<S, A>
where
    S: Serialize + Send + Sync + 'static,
    A: Action,
{
    let key = key.into();
    Arc::new(move |api: StoreApi<S, A>, next: DispatchFn<S, A>| -> DispatchFn<S, A> {
        let key = key.clone();
        let backend = backend.clone();
        Arc::new(move |dispatch| {
            next(dispatch)?;

            let written = api
                .get_state()
                .and_then(|state| Ok(serde_json::to_string(&*state)?))
                .and_then(|json| backend.set(&key, json));
            if let Err(err) = written {
                api.reporter().report(
                    ErrorRecord::from_error(&err)
                        .with_context(json!({ "store": api.name(), "key": key })),
                );
            }
            Ok(())
        })
    })
}

// == Hydration ==
/// Loads previously persisted state for `key`.
///
/// Returns `None` when nothing was stored; read and parse failures are
/// reported and also yield `None`.
pub fn load_persisted<S: DeserializeOwned>(
    backend: &dyn Persistence,
    key: &str,
    reporter: &dyn ErrorReporter,
) -> Option<S> {
    let loaded = backend
        .get(key)
        .and_then(|raw| match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        });
    match loaded {
        Ok(state) => state,
        Err(err) => {
            reporter.report(ErrorRecord::from_error(&err).with_context(json!({ "key": key })));
            None
        }
    }
}
