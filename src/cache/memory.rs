//! In-Memory Cache Backend
//!
//! A process-local store with the same key and value rules as memcached,
//! standing in for a memcached node in the test suites.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{decode_value, encode_value, validate_key, CacheClient};
use crate::error::Result;

// == Memory Cache ==
/// HashMap-backed `CacheClient`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// Encoded values by key
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned().map(decode_value))
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        validate_key(key)?;
        let encoded = encode_value(value)?;
        self.entries.write().await.insert(key.to_string(), encoded);
        Ok(())
    }
}
