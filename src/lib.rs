//! Cache Gateway - HTTP front end for a memcached cluster
//!
//! Reads and writes JSON values by key through `GET /` and `POST /`.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheClient, MemcachedClient, MemoryCache};
pub use config::Config;
pub use error::CacheError;
