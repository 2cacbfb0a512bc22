//! API Handlers
//!
//! HTTP request handlers for the gateway's single endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use tracing::debug;

use crate::cache::{validate_key, CacheClient, MemcachedClient};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{GetParams, GetResponse, SetRequest, SetResponse, MISSING_KEY_PARAM};

/// Application state shared across all handlers.
///
/// Holds the cache client built once at startup. Handlers keep no other state.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache client
    pub cache: Arc<dyn CacheClient>,
}

impl AppState {
    /// Creates a new AppState around the given cache client.
    pub fn new(cache: impl CacheClient + 'static) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Resolves the configured memcached nodes; fails if any does not resolve.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let client = MemcachedClient::connect(config).await?;
        Ok(Self::new(client))
    }
}

/// Handler for GET /?key=...
///
/// Retrieves a value from the cache by key. When `key` is repeated the
/// first occurrence wins.
pub async fn get_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<GetResponse>> {
    let key = match params {
        Ok(Query(pairs)) => GetParams::from_pairs(pairs).require_key()?,
        Err(_) => return Err(CacheError::InvalidRequest(MISSING_KEY_PARAM.to_string())),
    };
    validate_key(&key)?;

    debug!("Getting value for key: {}", key);
    match state.cache.get(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => {
            debug!("Key not found: {}", key);
            Err(CacheError::NotFound(key))
        }
    }
}

/// Handler for POST /
///
/// Stores a key-value pair in the cache. The body is parsed by hand so every
/// malformed payload gets the same 400 response, whatever its content type.
pub async fn set_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<SetResponse>> {
    let req = SetRequest::from_body(&body)?;
    validate_key(&req.key)?;

    debug!("Setting value for key: {}", req.key);
    state.cache.set(&req.key, &req.value).await?;
    debug!("Value successfully set for key {}", req.key);

    Ok(Json(SetResponse::ok()))
}
