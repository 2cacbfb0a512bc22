//! API Module
//!
//! HTTP handlers and routing for the gateway.
//!
//! # Endpoints
//! - `GET /?key=<key>` - Retrieve a value by key
//! - `POST /` - Store a `{"key": ..., "value": ...}` pair

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
