//! Shared state for the keep-alive routes

use std::sync::Arc;

use altawater_delivery::Coordinator;
use chrono::{DateTime, Utc};

#[derive(Clone)]
pub struct GatewayState {
    coordinator: Arc<Coordinator>,
    started_at: DateTime<Utc>,
}

impl GatewayState {
    pub fn new(coordinator: Arc<Coordinator>) -> Self {
        Self {
            coordinator,
            started_at: Utc::now(),
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
