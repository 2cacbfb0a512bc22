//! Configuration Module
//!
//! Loads the gateway configuration once at startup from environment variables.

use std::env;

/// Backend address used when `CACHE_SERVER` is unset or empty.
pub const DEFAULT_CACHE_SERVER: &str = "memcached:11211";

/// Gateway configuration parameters.
///
/// Read once before the router is built and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// memcached node addresses (`host:port`)
    pub cache_servers: Vec<String>,
    /// Upper bound for a single backend call attempt, in milliseconds
    pub cache_timeout_ms: u64,
    /// Expiration passed to memcached on every set, 0 means never
    pub cache_ttl: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 8080)
    /// - `CACHE_SERVER` - Comma separated memcached addresses (default: memcached:11211)
    /// - `CACHE_TIMEOUT_MS` - Per attempt backend timeout (default: 1000)
    /// - `CACHE_TTL` - Item expiration in seconds (default: 0)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cache_servers = lookup("CACHE_SERVER")
            .map(|raw| parse_server_list(&raw))
            .filter(|servers| !servers.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_CACHE_SERVER.to_string()]);

        Self {
            server_port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(8080),
            cache_servers,
            cache_timeout_ms: lookup("CACHE_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(1000),
            cache_ttl: lookup("CACHE_TTL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_server_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(String::from)
        .collect()
}
