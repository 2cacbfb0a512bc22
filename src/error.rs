//! Error types for the cache gateway
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the gateway.
///
/// A missing key is not an error at the backend boundary (`Ok(None)`);
/// `NotFound` only exists so handlers can turn a miss into a 404.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Client supplied a missing or malformed key/body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key does not exist in the store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Store could not be reached or the connection dropped
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    /// Store answered with an error or an unreadable item
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Value too large for a cache item
    #[error("Value of {0} bytes exceeds the cache item limit")]
    Capacity(usize),

    /// Store did not answer within the configured bound
    #[error("Cache backend timed out after {0}ms")]
    Timeout(u64),
}

impl CacheError {
    /// Whether a single retry of the backend call is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(self, CacheError::Unavailable(_) | CacheError::Timeout(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::NotFound(key) => (StatusCode::NOT_FOUND, format!("Key '{}' not found", key)),
            CacheError::Unavailable(detail) => {
                error!("Cache backend unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Cache backend unavailable".to_string(),
                )
            }
            CacheError::Backend(detail) => {
                error!("Cache backend failure: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            CacheError::Capacity(size) => {
                error!("Rejected value of {} bytes, over the cache item limit", size);
                (
                    StatusCode::INSUFFICIENT_STORAGE,
                    "Value exceeds the cache item size limit".to_string(),
                )
            }
            CacheError::Timeout(ms) => {
                error!("Cache backend timed out after {}ms", ms);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Cache backend timed out".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gateway.
pub type Result<T> = std::result::Result<T, CacheError>;
