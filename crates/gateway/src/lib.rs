//! # Altawater Gateway Crate
//!
//! The keep-alive HTTP listener that runs next to the bot's poll loop.
//! Hosting platforms probe `/` to decide whether the process is alive;
//! `/health` reports the same plus the number of outstanding requests.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use altawater_delivery::Coordinator;
//! use altawater_gateway::{create_router, GatewayState};
//!
//! # async fn run() -> std::io::Result<()> {
//! let state = GatewayState::new(Arc::new(Coordinator::new()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, create_router(state)).await
//! # }
//! ```

pub mod middleware;
pub mod rest;
pub mod state;

pub use state::GatewayState;

use axum::{middleware as axum_middleware, Router};

/// Create the keep-alive router with request tracing.
pub fn create_router(state: GatewayState) -> Router {
    rest::create_rest_routes()
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(middleware::create_trace_middleware())
}
