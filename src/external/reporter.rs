//! Error Reporting Module
//!
//! Structured error records and the sinks that surface them.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::error::PortalError;

// == Error Record ==
/// Structured description of a failure handed to an [`ErrorReporter`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Error class, e.g. `EffectError`
    pub name: String,
    /// Human readable message
    pub message: String,
    /// Stable machine-readable code
    pub code: String,
    /// Extra data such as the store name or action kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// When the failure was observed
    pub timestamp: DateTime<Utc>,
    /// Whether the failure was swallowed (true) or propagated to a caller (false)
    pub handled: bool,
}

impl ErrorRecord {
    /// Creates a record stamped with the current time, marked as handled.
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code: code.into(),
            context: None,
            timestamp: Utc::now(),
            handled: true,
        }
    }

    /// Builds a record from a [`PortalError`].
    pub fn from_error(err: &PortalError) -> Self {
        Self::new("PortalError", err.to_string(), err.code())
    }

    /// Attaches context data.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Sets the handled flag.
    pub fn handled(mut self, handled: bool) -> Self {
        self.handled = handled;
        self
    }
}

// == Reporter Trait ==
/// Sink for error records. Called synchronously; the return value is never inspected.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, record: ErrorRecord);
}

// == Tracing Reporter ==
/// Emits every record as a tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, record: ErrorRecord) {
        let context = record
            .context
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
        if record.handled {
            warn!(
                name = %record.name,
                code = %record.code,
                context = %context,
                "{}",
                record.message
            );
        } else {
            error!(
                name = %record.name,
                code = %record.code,
                context = %context,
                "{}",
                record.message
            );
        }
    }
}

// == Memory Reporter ==
/// Keeps every record in memory. Useful for tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    records: Mutex<Vec<ErrorRecord>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record reported so far.
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the codes of every record, in report order.
    pub fn codes(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.code).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for MemoryReporter {
    fn report(&self, record: ErrorRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
