//! Actions
//!
//! Each store defines a closed enum of actions; [`Dispatch`] adds thunks on top.

use std::fmt;

use crate::error::Result;
use crate::store::StoreApi;

/// A store action. Implemented by each domain's action enum.
///
/// `kind` names the variant and keys effects, validators and log lines.
pub trait Action: Clone + fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> &'static str;
}

/// Deferred dispatch logic, run by the thunk middleware with access to the store.
pub type Thunk<S, A> = Box<dyn FnOnce(&StoreApi<S, A>) -> Result<()> + Send>;

// == Dispatch ==
/// What flows through the middleware chain: a plain action or a thunk.
pub enum Dispatch<S, A> {
    Action(A),
    Thunk(Thunk<S, A>),
}

impl<S, A: Action> Dispatch<S, A> {
    /// Wraps a closure as a thunk.
    pub fn thunk<F>(f: F) -> Self
    where
        F: FnOnce(&StoreApi<S, A>) -> Result<()> + Send + 'static,
    {
        Dispatch::Thunk(Box::new(f))
    }

    /// The action kind, or `"thunk"` for thunks.
    pub fn kind(&self) -> &'static str {
        match self {
            Dispatch::Action(action) => action.kind(),
            Dispatch::Thunk(_) => "thunk",
        }
    }

    pub fn as_action(&self) -> Option<&A> {
        match self {
            Dispatch::Action(action) => Some(action),
            Dispatch::Thunk(_) => None,
        }
    }
}

impl<S, A> From<A> for Dispatch<S, A> {
    fn from(action: A) -> Self {
        Dispatch::Action(action)
    }
}

impl<S, A: fmt::Debug> fmt::Debug for Dispatch<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Action(action) => action.fmt(f),
            Dispatch::Thunk(_) => f.write_str("Thunk"),
        }
    }
}
