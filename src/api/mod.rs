//! Admin API Module
//!
//! HTTP handlers and routing for inspecting the cache and the domain stores.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `GET /cache/stats` - Cache statistics
//! - `PUT /cache` - Store a JSON value
//! - `GET /cache/:key` - Retrieve a value
//! - `DELETE /cache/:key` - Delete a key
//! - `GET /stores` - List store names
//! - `GET /stores/:name` - Current state of a store
//! - `POST /stores/:name/dispatch` - Dispatch a `{"type", "payload"}` action
//! - `GET /outbox` - Number of items waiting for sync
//! - `POST /outbox/drain` - Take every queued sync item

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
