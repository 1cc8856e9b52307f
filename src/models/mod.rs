//! Request and response models for the admin API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.
//! Error bodies come from [`crate::error::PortalError`]'s `IntoResponse`.

pub mod requests;
pub mod responses;

pub use requests::SetRequest;
pub use responses::{
    DeleteResponse, DispatchResponse, DrainResponse, GetResponse, HealthResponse, OutboxResponse,
    SetResponse, StateResponse, StatsResponse, StoresResponse,
};
