//! Error types for the portal state core
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Portal Error Enum ==
/// Unified error type for the cache, container and stores.
#[derive(Error, Debug)]
pub enum PortalError {
    /// No service registered under the requested id
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// Service id re-entered while its own construction was in progress
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    /// Resolved service is not of the requested type
    #[error("Service '{id}' is not a {expected}")]
    ServiceType { id: String, expected: &'static str },

    /// No store registered under the requested name
    #[error("Store not found: {0}")]
    StoreNotFound(String),

    /// A store with this name already exists
    #[error("Store already exists: {0}")]
    StoreExists(String),

    /// Store exists but holds a different state/action type
    #[error("Store '{0}' has a different state or action type")]
    StoreType(String),

    /// A registered validator rejected the action payload
    #[error("Invalid payload for action '{0}'")]
    InvalidPayload(String),

    /// Dispatch received something it cannot handle (e.g. a thunk without thunk middleware)
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Reducer failed while applying an action
    #[error("Reducer failed on '{action}': {source}")]
    Reducer {
        action: String,
        #[source]
        source: anyhow::Error,
    },

    /// Serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Malformed admin request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache key absent or expired
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Cache refused the value (too large or not serializable)
    #[error("Cache rejected value for key: {0}")]
    CacheRejected(String),

    /// Persistence backend failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Stable machine-readable code used in error reports.
    pub fn code(&self) -> &'static str {
        match self {
            PortalError::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            PortalError::CircularDependency { .. } => "CIRCULAR_DEPENDENCY",
            PortalError::ServiceType { .. } => "SERVICE_TYPE_MISMATCH",
            PortalError::StoreNotFound(_) => "STORE_NOT_FOUND",
            PortalError::StoreExists(_) => "STORE_EXISTS",
            PortalError::StoreType(_) => "STORE_TYPE_MISMATCH",
            PortalError::InvalidPayload(_) => "INVALID_PAYLOAD",
            PortalError::InvalidAction(_) => "INVALID_ACTION",
            PortalError::Reducer { .. } => "REDUCER_ERROR",
            PortalError::Serialization(_) => "SERIALIZATION_ERROR",
            PortalError::InvalidRequest(_) => "INVALID_REQUEST",
            PortalError::KeyNotFound(_) => "KEY_NOT_FOUND",
            PortalError::CacheRejected(_) => "CACHE_REJECTED",
            PortalError::Persistence(_) => "PERSISTENCE_ERROR",
            PortalError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = match &self {
            PortalError::ServiceNotFound(_)
            | PortalError::StoreNotFound(_)
            | PortalError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            PortalError::StoreExists(_) => StatusCode::CONFLICT,
            PortalError::InvalidPayload(_)
            | PortalError::InvalidAction(_)
            | PortalError::InvalidRequest(_)
            | PortalError::Serialization(_) => StatusCode::BAD_REQUEST,
            PortalError::Reducer { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PortalError::CacheRejected(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the portal state core.
pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_dependency_message_lists_chain() {
        let err = PortalError::CircularDependency {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
        assert_eq!(err.code(), "CIRCULAR_DEPENDENCY");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = PortalError::StoreNotFound("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cache_errors_map_to_status() {
        let missing = PortalError::KeyNotFound("k".into()).into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        let rejected = PortalError::CacheRejected("k".into()).into_response();
        assert_eq!(rejected.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_invalid_payload_maps_to_400() {
        let response = PortalError::InvalidPayload("inc".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
