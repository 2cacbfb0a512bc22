//! Request and Response models for the gateway API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{GetParams, SetRequest, MISSING_BODY_FIELDS, MISSING_KEY_PARAM};
pub use responses::{ErrorResponse, GetResponse, SetResponse};
