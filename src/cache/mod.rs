//! Cache Module
//!
//! The `CacheClient` port used by the HTTP handlers, plus its backends:
//! memcached for production and an in-process map for tests.

mod client;
mod memcached;
mod memory;
mod shard;


// Re-export public types
pub use client::{decode_value, encode_value, retry_once, validate_key, CacheClient};
pub use memcached::MemcachedClient;
pub use memory::MemoryCache;
pub use shard::shard_index;

// == Public Constants ==
/// Maximum key length accepted by memcached, in bytes
pub const MAX_KEY_LENGTH: usize = 250;

/// Maximum encoded value size: memcached's default 1 MB item, less room
/// for the item header and the longest key
pub const MAX_VALUE_SIZE: usize = 1024 * 1024 - 512;
