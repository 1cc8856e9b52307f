//! External Collaborators Module
//!
//! Interfaces the core calls out to but does not own: error reporting,
//! key-value persistence and the process-wide event bus.

mod bus;
mod persistence;
mod reporter;

pub use bus::{BroadcastBus, BusEvent, EventBus, STORE_UPDATED};
pub use persistence::{FilePersistence, MemoryPersistence, Persistence};
pub use reporter::{ErrorRecord, ErrorReporter, MemoryReporter, TracingReporter};
