//! Cache Client Port
//!
//! The contract every backend fulfils, and the key/value rules shared by them.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

// == Cache Client Trait ==
/// Single point of contact with a key/value store.
///
/// `get` returns `Ok(None)` for a key the store does not hold. Failing to
/// talk to the store is always an `Err`, never a miss.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Looks up the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &Value) -> Result<()>;
}

// == Key Validation ==
/// Checks a key against memcached's rules.
///
/// Keys must be 1 to 250 bytes with no whitespace or control characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CacheError::InvalidRequest(
            "Key cannot contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}

// == Value Encoding ==
/// Encodes a value as the JSON text held by the store.
pub fn encode_value(value: &Value) -> Result<String> {
    let encoded = serde_json::to_string(value)
        .map_err(|e| CacheError::InvalidRequest(format!("Value is not serializable: {}", e)))?;

    if encoded.len() > MAX_VALUE_SIZE {
        return Err(CacheError::Capacity(encoded.len()));
    }
    Ok(encoded)
}

/// Decodes stored text back into a value.
///
/// Items written by other clients may not be JSON; those come back as strings.
pub fn decode_value(raw: String) -> Value {
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(_) => Value::String(raw),
    }
}

// == Retry ==
/// Runs `op`, running it once more if the first attempt failed transiently.
pub async fn retry_once<T, F, Fut>(key: &str, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match op().await {
        Err(err) if err.is_transient() => {
            warn!("Retrying backend call for key {}: {}", key, err);
            op().await
        }
        other => other,
    }
}
