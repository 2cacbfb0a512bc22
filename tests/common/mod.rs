//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use cache_gateway::{api::create_router, AppState, CacheClient, CacheError, MemoryCache};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tower::ServiceExt;

// == Router Helpers ==

pub fn create_test_app() -> Router {
    create_router(AppState::new(MemoryCache::new()))
}

pub async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post(app: &Router, body: impl Into<Body>) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn status_and_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == Failing Backend ==

/// Backend that fails every call with a copy of the configured error.
pub struct FailingCache {
    kind: FailureKind,
}

#[derive(Clone, Copy)]
pub enum FailureKind {
    Unavailable,
    Backend,
    Timeout,
}

impl FailingCache {
    pub fn new(kind: FailureKind) -> Self {
        Self { kind }
    }

    fn error(&self) -> CacheError {
        match self.kind {
            FailureKind::Unavailable => CacheError::Unavailable("connection refused".into()),
            FailureKind::Backend => CacheError::Backend("SERVER_ERROR out of memory".into()),
            FailureKind::Timeout => CacheError::Timeout(100),
        }
    }
}

#[async_trait]
impl CacheClient for FailingCache {
    async fn get(&self, _key: &str) -> cache_gateway::error::Result<Option<Value>> {
        Err(self.error())
    }

    async fn set(&self, _key: &str, _value: &Value) -> cache_gateway::error::Result<()> {
        Err(self.error())
    }
}

// == Fake Memcached ==

/// Stored item: flags, exptime, data
type Item = (u32, u32, Vec<u8>);

/// Minimal memcached speaking the text protocol (get, gets, set, version).
pub struct FakeMemcached {
    pub addr: SocketAddr,
    items: Arc<Mutex<HashMap<String, Item>>>,
    handle: JoinHandle<()>,
}

impl FakeMemcached {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let items: Arc<Mutex<HashMap<String, Item>>> = Arc::default();

        let shared = Arc::clone(&items);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let items = Arc::clone(&shared);
                tokio::spawn(async move {
                    let _ = serve_connection(stream, items).await;
                });
            }
        });

        Self {
            addr,
            items,
            handle,
        }
    }

    /// Stores raw bytes the way another memcached client would.
    pub fn seed(&self, key: &str, data: &[u8]) {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), (0, 0, data.to_vec()));
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.items.lock().unwrap().get(key).map(|item| item.2.clone())
    }

    pub fn exptime(&self, key: &str) -> Option<u32> {
        self.items.lock().unwrap().get(key).map(|item| item.1)
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

impl Drop for FakeMemcached {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_connection(
    stream: TcpStream,
    items: Arc<Mutex<HashMap<String, Item>>>,
) -> std::io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.first().copied() {
            Some(cmd @ ("get" | "gets")) => {
                let mut out = Vec::new();
                {
                    let items = items.lock().unwrap();
                    for key in &parts[1..] {
                        if let Some((flags, _, data)) = items.get(*key) {
                            let header = if cmd == "gets" {
                                format!("VALUE {} {} {} 1\r\n", key, flags, data.len())
                            } else {
                                format!("VALUE {} {} {}\r\n", key, flags, data.len())
                            };
                            out.extend_from_slice(header.as_bytes());
                            out.extend_from_slice(data);
                            out.extend_from_slice(b"\r\n");
                        }
                    }
                }
                out.extend_from_slice(b"END\r\n");
                write.write_all(&out).await?;
            }
            Some("set") if parts.len() >= 5 => {
                let flags: u32 = parts[2].parse().unwrap_or(0);
                let exptime: u32 = parts[3].parse().unwrap_or(0);
                let len: usize = parts[4].parse().unwrap_or(0);
                let mut data = vec![0u8; len + 2];
                reader.read_exact(&mut data).await?;
                data.truncate(len);
                items
                    .lock()
                    .unwrap()
                    .insert(parts[1].to_string(), (flags, exptime, data));
                if parts.get(5) != Some(&"noreply") {
                    write.write_all(b"STORED\r\n").await?;
                }
            }
            Some("version") => write.write_all(b"VERSION 1.6.21\r\n").await?,
            _ => write.write_all(b"ERROR\r\n").await?,
        }
        write.flush().await?;
    }
}
