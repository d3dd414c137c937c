pub mod presence;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::post, Router};
use roomwatch_common::clock::Clock;
use roomwatch_common::presence::PresenceEntry;
use serde::{Deserialize, Serialize};

use crate::presence::PresenceRegistry;

/// Largest TTL a caller may ask for.
pub const MAX_PRESENCE_TTL_MS: u64 = 24 * 60 * 60 * 1000;

pub struct ApiState<C: Clock> {
    registry: Arc<PresenceRegistry<C>>,
    default_ttl: Duration,
}

impl<C: Clock> Clone for ApiState<C> {
    fn clone(&self) -> Self {
        Self { registry: Arc::clone(&self.registry), default_ttl: self.default_ttl }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPresenceQuery {
    pub ttl_ms: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresencePageEnvelope {
    pub items: Vec<PresenceEntry>,
}

/// Presence routes:
///
/// - `POST /v1/rooms/{room}/presence`: heartbeat, always `204`.
/// - `GET /v1/rooms/{room}/presence?ttl_ms=N`: live entries, most recent first.
pub fn router<C: Clock>(registry: Arc<PresenceRegistry<C>>, default_ttl: Duration) -> Router {
    let state = ApiState { registry, default_ttl };

    Router::new()
        .route(
            "/v1/rooms/{room}/presence",
            post(presence::touch_presence::<C>).get(presence::list_presence::<C>),
        )
        .with_state(state)
}
