//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::SetOptions;
use crate::error::{PortalError, Result};
use crate::models::{
    DeleteResponse, DispatchResponse, DrainResponse, GetResponse, HealthResponse, OutboxResponse,
    SetRequest, SetResponse, StateResponse, StatsResponse, StoresResponse,
};
use crate::portal::Portal;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct ApiState {
    pub portal: Arc<Portal>,
}

impl ApiState {
    pub fn new(portal: Arc<Portal>) -> Self {
        Self { portal }
    }
}

// == Cache ==
/// Handler for `PUT /cache`
pub async fn set_handler(
    State(state): State<ApiState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(PortalError::InvalidRequest(error_msg));
    }

    let options = SetOptions {
        ttl: req.ttl_ms.map(Duration::from_millis),
        metadata: req.metadata,
    };
    let mut cache = state.portal.cache().write().await;
    if !cache.set(req.key.clone(), req.value, options) {
        return Err(PortalError::CacheRejected(req.key));
    }

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for `GET /cache/:key`
pub async fn get_handler(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: reads update statistics and drop expired entries
    let mut cache = state.portal.cache().write().await;
    match cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(PortalError::KeyNotFound(key)),
    }
}

/// Handler for `DELETE /cache/:key`
pub async fn delete_handler(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.portal.cache().write().await;
    if !cache.delete(&key) {
        return Err(PortalError::KeyNotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for `GET /cache/stats`
pub async fn stats_handler(State(state): State<ApiState>) -> Json<StatsResponse> {
    let cache = state.portal.cache().read().await;
    Json(cache.stats().into())
}

/// Handler for `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Stores ==
/// Handler for `GET /stores`
pub async fn stores_handler(State(state): State<ApiState>) -> Json<StoresResponse> {
    Json(StoresResponse {
        stores: state.portal.store_names(),
    })
}

/// Handler for `GET /stores/:name`
pub async fn state_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<StateResponse>> {
    let current = state.portal.state_json(&name)?;
    Ok(Json(StateResponse {
        store: name,
        state: current,
    }))
}

/// Handler for `POST /stores/:name/dispatch`
pub async fn dispatch_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(action): Json<Value>,
) -> Result<Json<DispatchResponse>> {
    let kind = action
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| PortalError::InvalidAction("missing string field 'type'".into()))?
        .to_string();
    debug!(store = %name, action = %kind, "admin dispatch");

    state.portal.dispatch_json(&name, action)?;
    let current = state.portal.state_json(&name)?;

    Ok(Json(DispatchResponse {
        store: name,
        action: kind,
        state: current,
    }))
}

// == Outbox ==
/// Handler for `GET /outbox`
pub async fn outbox_handler(State(state): State<ApiState>) -> Result<Json<OutboxResponse>> {
    let outbox = state.portal.outbox()?;
    Ok(Json(OutboxResponse {
        pending: outbox.pending(),
    }))
}

/// Handler for `POST /outbox/drain`
///
/// Hands every queued item to the caller and empties the outbox.
pub async fn drain_outbox_handler(State(state): State<ApiState>) -> Result<Json<DrainResponse>> {
    let items = state.portal.outbox()?.drain();
    debug!(drained = items.len(), "outbox drained");
    Ok(Json(items.into()))
}
