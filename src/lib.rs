//! Portal State - application-state core for a patient/provider health portal
//!
//! Provides a TTL/size-bounded cache, a dependency-injection container,
//! reducer-driven stores with middleware and detached effects, and the
//! app/patient/provider domain stores built on them.

pub mod api;
pub mod cache;
pub mod config;
pub mod container;
pub mod domains;
pub mod error;
pub mod external;
pub mod models;
pub mod portal;
pub mod services;
pub mod store;
pub mod tasks;

pub use api::{create_router, ApiState};
pub use cache::{Cache, CacheConfig, SetOptions};
pub use config::Config;
pub use container::{Container, Dependencies, ServiceDefinition};
pub use error::{PortalError, Result};
pub use portal::Portal;
pub use store::{Action, Store, StoreConfig, StoreManager};
pub use tasks::spawn_sweep_task;
