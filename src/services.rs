//! Application Services
//!
//! Services registered in the [`Container`] at startup. Store effects get
//! the outbox injected; the domain stores resolve persistence and reporting.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::container::{Container, ServiceDefinition};
use crate::external::{ErrorReporter, EventBus, Persistence};

/// Container id of the shared [`SyncOutbox`].
pub const OUTBOX: &str = "sync.outbox";

/// Container id of the error reporter (`Arc<dyn ErrorReporter>`).
pub const REPORTER: &str = "error.reporter";

/// Container id of the persistence backend (`Arc<dyn Persistence>`).
pub const PERSISTENCE: &str = "persistence";

/// Container id of the event bus (`Arc<dyn EventBus>`).
pub const EVENT_BUS: &str = "event.bus";

/// Event emitted on the bus whenever an item is queued for sync.
pub const OUTBOX_QUEUED: &str = "outbox:queued";

// == Outbox Item ==
/// A pending write to the remote backend.
#[derive(Debug, Clone, Serialize)]
pub struct OutboxItem {
    /// Kind of record, e.g. `check_in`
    pub entity: String,
    pub payload: Value,
    pub queued_at: DateTime<Utc>,
}

// == Sync Outbox ==
/// Queue of local changes waiting to be pushed to the backend.
pub struct SyncOutbox {
    items: Mutex<Vec<OutboxItem>>,
    bus: Arc<dyn EventBus>,
}

impl SyncOutbox {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            bus,
        }
    }

    /// Queues a record and announces it on the bus.
    pub fn enqueue(&self, entity: impl Into<String>, payload: Value) {
        let item = OutboxItem {
            entity: entity.into(),
            payload,
            queued_at: Utc::now(),
        };
        debug!(entity = %item.entity, "outbox item queued");
        let announcement = serde_json::json!({ "entity": item.entity });
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
        self.bus.emit(OUTBOX_QUEUED, Some(announcement));
    }

    /// Removes and returns everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<OutboxItem> {
        std::mem::take(&mut *self.items.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn pending(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// == Registration ==
/// Registers the shared collaborators and application services.
pub fn register_services(
    container: &mut Container,
    reporter: Arc<dyn ErrorReporter>,
    persistence: Arc<dyn Persistence>,
    bus: Arc<dyn EventBus>,
) {
    container.register(ServiceDefinition::instance(REPORTER, Arc::new(reporter)));
    container.register(ServiceDefinition::instance(PERSISTENCE, Arc::new(persistence)));
    container.register(ServiceDefinition::instance(EVENT_BUS, Arc::new(bus)));
    container.register(
        ServiceDefinition::new(OUTBOX, |deps| {
            let bus = deps.get::<Arc<dyn EventBus>>(0)?;
            Ok(SyncOutbox::new((*bus).clone()))
        })
        .depends_on([EVENT_BUS]),
    );
}
