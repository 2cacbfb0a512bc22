//! Memcached Cache Backend
//!
//! `CacheClient` over one or more memcached nodes speaking the text protocol.
//! Keys are sharded across nodes with [`shard_index`]; each node gets its own
//! connection pool, opened on first use so a node that is down at startup
//! only fails the requests routed to it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use memcache::MemcacheError;
use serde_json::Value;
use tokio::net::lookup_host;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::{decode_value, encode_value, retry_once, shard_index, validate_key, CacheClient};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Node ==
/// One memcached node and its lazily opened client.
struct Node {
    /// `host:port` as configured
    addr: String,
    /// Connection URL understood by the memcache crate
    url: String,
    client: OnceCell<Arc<memcache::Client>>,
}

// == Memcached Client ==
/// Sharded memcached backend.
pub struct MemcachedClient {
    nodes: Vec<Node>,
    /// Bound for a single attempt of a backend call
    timeout: Duration,
    /// Expiration in seconds sent with every set, 0 means never
    ttl: u32,
}

impl MemcachedClient {
    // == Constructor ==
    /// Builds a client for the configured nodes without opening connections.
    pub fn new(config: &Config) -> Self {
        let timeout = Duration::from_millis(config.cache_timeout_ms);
        let nodes = config
            .cache_servers
            .iter()
            .map(|addr| {
                let addr = addr.strip_prefix("memcache://").unwrap_or(addr);
                Node {
                    addr: addr.to_string(),
                    url: connection_url(addr),
                    client: OnceCell::new(),
                }
            })
            .collect();

        Self {
            nodes,
            timeout,
            ttl: config.cache_ttl,
        }
    }

    /// Builds a client after checking that every node address resolves.
    ///
    /// An address that does not resolve is a startup failure.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Self::new(config);
        for node in &client.nodes {
            let mut resolved = lookup_host(node.addr.as_str()).await.map_err(|e| {
                CacheError::Unavailable(format!("cannot resolve {}: {}", node.addr, e))
            })?;
            match resolved.next() {
                Some(socket) => info!("Cache node {} resolved to {}", node.addr, socket),
                None => {
                    return Err(CacheError::Unavailable(format!(
                        "{} resolved to no addresses",
                        node.addr
                    )))
                }
            }
        }
        Ok(client)
    }

    /// Returns the configured node addresses in shard order.
    pub fn nodes(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.addr.as_str()).collect()
    }

    fn node_for(&self, key: &str) -> &Node {
        &self.nodes[shard_index(key, self.nodes.len())]
    }

    // == Blocking Bridge ==
    /// Runs a blocking memcache call off the async workers.
    ///
    /// The call itself is bounded by the pool and socket timeouts set in
    /// [`open_client`]; the guard here only catches a call that overruns them.
    /// The outer error covers overruns and panics; the inner one is the
    /// memcache result for the caller to classify.
    async fn blocking<T, F>(&self, op: F) -> Result<std::result::Result<T, MemcacheError>>
    where
        F: FnOnce() -> std::result::Result<T, MemcacheError> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::task::spawn_blocking(op);
        match tokio::time::timeout(self.timeout * 2, task).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(join_err)) => Err(CacheError::Backend(format!(
                "memcache task failed: {}",
                join_err
            ))),
            Err(_) => Err(CacheError::Timeout((self.timeout * 2).as_millis() as u64)),
        }
    }

    async fn client_for(&self, node: &Node) -> Result<Arc<memcache::Client>> {
        let client = node
            .client
            .get_or_try_init(|| async {
                let url = node.url.clone();
                let timeout = self.timeout;
                let client = self
                    .blocking(move || open_client(url, timeout))
                    .await?
                    .map_err(|e| {
                        CacheError::Unavailable(format!("connect to {}: {}", node.addr, e))
                    })?;
                info!("Connected to cache node {}", node.addr);
                Ok::<_, CacheError>(Arc::new(client))
            })
            .await?;
        Ok(Arc::clone(client))
    }

    // == Single Attempts ==
    async fn get_once(&self, key: &str) -> Result<Option<String>> {
        let node = self.node_for(key);
        let client = self.client_for(node).await?;
        let owned_key = key.to_string();
        self.blocking(move || client.get::<String>(&owned_key))
            .await?
            .map_err(|e| classify(&node.addr, e))
    }

    async fn set_once(&self, key: &str, encoded: &str) -> Result<()> {
        let node = self.node_for(key);
        let client = self.client_for(node).await?;
        let owned_key = key.to_string();
        let owned_value = encoded.to_string();
        let ttl = self.ttl;
        self.blocking(move || client.set(&owned_key, owned_value.as_str(), ttl))
            .await?
            .map_err(|e| classify(&node.addr, e))
    }
}

#[async_trait]
impl CacheClient for MemcachedClient {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        validate_key(key)?;
        let raw = retry_once(key, || self.get_once(key)).await?;
        debug!("memcached get {} -> {}", key, if raw.is_some() { "hit" } else { "miss" });
        Ok(raw.map(decode_value))
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        validate_key(key)?;
        let encoded = encode_value(value)?;
        retry_once(key, || self.set_once(key, &encoded)).await?;
        debug!("memcached set {} ({} bytes)", key, encoded.len());
        Ok(())
    }
}

// == Helpers ==
/// Builds the memcache crate URL for a node, forcing the text protocol.
fn connection_url(addr: &str) -> String {
    format!("memcache://{}?tcp_nodelay=true&protocol=ascii", addr)
}

/// Opens a node's connection pool with every wait bounded by `timeout`.
///
/// The pool's connection timeout covers both the initial connect and each
/// checkout.
fn open_client(
    url: String,
    timeout: Duration,
) -> std::result::Result<memcache::Client, MemcacheError> {
    memcache::Client::builder()
        .add_server(url)?
        .with_connection_timeout(timeout)
        .with_read_timeout(timeout)
        .with_write_timeout(timeout)
        .build()
}

/// I/O failures mean the node went away; anything else is a bad answer.
fn classify(addr: &str, err: MemcacheError) -> CacheError {
    match err {
        MemcacheError::IOError(e) => CacheError::Unavailable(format!("{}: {}", addr, e)),
        other => CacheError::Backend(format!("{}: {}", addr, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(servers: &[&str]) -> Config {
        Config {
            cache_servers: servers.iter().map(|s| s.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn test_connection_url() {
        let url = connection_url("memcached:11211");
        assert_eq!(url, "memcache://memcached:11211?tcp_nodelay=true&protocol=ascii");
    }

    #[test]
    fn test_configured_scheme_is_stripped() {
        let client = MemcachedClient::new(&config_with(&["memcache://10.0.0.5:11211"]));
        assert_eq!(client.nodes(), vec!["10.0.0.5:11211"]);
        assert!(client.nodes[0].url.starts_with("memcache://10.0.0.5:11211?"));
    }

    #[test]
    fn test_nodes_keep_configured_order() {
        let client = MemcachedClient::new(&config_with(&["a:1", "b:2", "c:3"]));
        assert_eq!(client.nodes(), vec!["a:1", "b:2", "c:3"]);
    }

    #[test]
    fn test_io_errors_are_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(
            classify("a:1", MemcacheError::IOError(io)),
            CacheError::Unavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_unresolvable_address() {
        let result = MemcachedClient::connect(&config_with(&["no-port-given"])).await;
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_invalid_key_never_reaches_backend() {
        // nothing listens here; a backend call would fail with a different error
        let client = MemcachedClient::new(&config_with(&["127.0.0.1:1"]));
        let result = client.get("bad key").await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }
}
