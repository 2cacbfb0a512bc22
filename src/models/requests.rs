//! Request DTOs for the gateway API
//!
//! Defines the shape of the GET query string and the POST body.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CacheError, Result};

/// Error message for a GET without a usable `key` parameter
pub const MISSING_KEY_PARAM: &str = "Please provide a 'key' parameter in the query";

/// Error message for a POST body that is not `{"key": ..., "value": ...}`
pub const MISSING_BODY_FIELDS: &str = "Please provide both 'key' and 'value' in the request body";

/// Query string of the GET operation (GET /?key=...)
#[derive(Debug, Clone, Default)]
pub struct GetParams {
    /// The cache key to look up
    pub key: Option<String>,
}

impl GetParams {
    /// Picks the first `key` out of decoded query pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let key = pairs
            .into_iter()
            .find(|(name, _)| name == "key")
            .map(|(_, value)| value);
        Self { key }
    }

    /// Returns the key, rejecting a missing or empty one.
    pub fn require_key(self) -> Result<String> {
        match self.key {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(CacheError::InvalidRequest(MISSING_KEY_PARAM.to_string())),
        }
    }
}

/// Request body for the SET operation (POST /)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value, `null` included
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
}

impl SetRequest {
    /// Parses a raw request body.
    ///
    /// Anything other than a JSON object with a non-empty string `key` and a
    /// `value` is rejected. Unknown fields are ignored.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let missing = || CacheError::InvalidRequest(MISSING_BODY_FIELDS.to_string());

        let parsed: Value = serde_json::from_slice(body).map_err(|_| missing())?;
        if !parsed.is_object() {
            return Err(missing());
        }
        let req: SetRequest = serde_json::from_value(parsed).map_err(|_| missing())?;
        if req.key.is_empty() {
            return Err(missing());
        }
        Ok(req)
    }
}
