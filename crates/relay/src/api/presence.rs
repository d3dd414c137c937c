use std::time::Duration;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    http::StatusCode,
};
use roomwatch_common::clock::Clock;
use roomwatch_common::presence::PresenceUser;
use serde_json::json;

use crate::error::RelayError;

use super::{ApiState, ListPresenceQuery, PresencePageEnvelope, MAX_PRESENCE_TTL_MS};

pub(super) async fn touch_presence<C: Clock>(
    State(state): State<ApiState<C>>,
    Path(room): Path<String>,
    payload: Result<Json<PresenceUser>, JsonRejection>,
) -> Result<StatusCode, RelayError> {
    let Json(user) = payload?;
    state.registry.touch(&room, &user);
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_presence<C: Clock>(
    State(state): State<ApiState<C>>,
    Path(room): Path<String>,
    query: Result<Query<ListPresenceQuery>, QueryRejection>,
) -> Result<Json<PresencePageEnvelope>, RelayError> {
    let Query(query) = query?;
    let ttl = match query.ttl_ms {
        Some(ms) if ms > MAX_PRESENCE_TTL_MS => {
            return Err(RelayError::validation(format!(
                "ttl_ms must be at most {MAX_PRESENCE_TTL_MS}"
            ))
            .with_details(json!({ "field": "ttl_ms" })));
        }
        Some(ms) => Duration::from_millis(ms),
        None => state.default_ttl,
    };

    Ok(Json(PresencePageEnvelope { items: state.registry.list_active(&room, ttl) }))
}
