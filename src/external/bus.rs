//! Event Bus Module
//!
//! Process-wide fire-and-forget notifications, built on `tokio::sync::broadcast`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

/// Event name emitted by every store after a dispatch is handled.
pub const STORE_UPDATED: &str = "store:updated";

/// Default number of events buffered per subscriber.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

// == Bus Event ==
/// A single event broadcast on the bus.
#[derive(Debug, Clone, Serialize)]
pub struct BusEvent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    pub emitted_at: DateTime<Utc>,
}

// == Event Bus Trait ==
/// Publishing side of the bus. Emission never waits for or reports delivery.
pub trait EventBus: Send + Sync {
    fn emit(&self, name: &str, payload: Option<Value>);
}

// == Broadcast Bus ==
/// In-memory bus; every subscriber receives every event emitted after it subscribed.
#[derive(Debug)]
pub struct BroadcastBus {
    sender: broadcast::Sender<BusEvent>,
    emitted: AtomicU64,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            emitted: AtomicU64::new(0),
        }
    }

    /// Opens a new receiver. Slow receivers observe `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Total number of events emitted, delivered or not.
    pub fn events_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for BroadcastBus {
    fn emit(&self, name: &str, payload: Option<Value>) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        let event = BusEvent {
            name: name.to_string(),
            payload,
            emitted_at: Utc::now(),
        };
        // No receivers is not an error for a fire-and-forget bus
        let receivers = self.sender.send(event).unwrap_or(0);
        trace!(event = name, receivers, "bus event emitted");
    }
}
