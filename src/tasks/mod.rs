//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a [`crate::Portal`].
//!
//! # Tasks
//! - Cache sweep: removes expired cache entries at the configured interval

mod sweep;

pub use sweep::{spawn_sweep_task, MIN_SWEEP_INTERVAL};
