//! API Routes
//!
//! Configures the Axum router for the gateway endpoint.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{get_handler, set_handler, AppState};

/// Creates the router serving `GET /` and `POST /`.
///
/// # Middleware
/// - CORS: Allows any origin, the browser front end calls the API directly
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(get_handler).post(set_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
