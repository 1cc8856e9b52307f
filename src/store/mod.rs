//! Store Module
//!
//! Per-domain state containers: reducer-driven transitions, detached async
//! effects, and a composable middleware chain around dispatch.

mod action;
mod manager;
pub mod middleware;
mod state_store;

pub use action::{Action, Dispatch, Thunk};
pub use manager::StoreManager;
pub use state_store::{
    DispatchFn, Effect, EffectFuture, Middleware, Reducer, Store, StoreApi, StoreConfig, StoreEnv,
    Subscription,
};
