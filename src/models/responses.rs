//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Response body for the GET operation (GET /?key=...)
///
/// Serializes as a single-entry object keyed by the requested key,
/// e.g. `{"alpha": 42}`.
#[derive(Debug, Clone, PartialEq)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl Serialize for GetResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

/// Response body for the SET operation (POST /)
#[derive(Debug, Clone, serde::Serialize)]
pub struct SetResponse {
    /// Always true; failures are reported through errors
    pub success: bool,
}

impl SetResponse {
    /// Creates the success acknowledgment
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
