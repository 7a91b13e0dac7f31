//! REST endpoints served by the keep-alive listener

pub mod health;

use axum::{routing::get, Router};

use crate::state::GatewayState;

pub fn create_rest_routes() -> Router<GatewayState> {
    Router::new()
        .route("/", get(health::alive))
        .route("/health", get(health::health_check))
}
