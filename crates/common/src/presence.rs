// Presence wire types shared by the relay and its clients.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Heartbeat age after which an entry stops being reported as live.
pub const DEFAULT_PRESENCE_TTL: Duration = Duration::from_millis(45_000);

/// Placeholder display name for users that did not send one.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder role for users that did not send one.
pub const UNKNOWN_ROLE: &str = "unknown";

/// Heartbeat payload as sent by a client.
///
/// Every field is optional on the wire; [`PresenceUser::normalize`] decides
/// whether the heartbeat is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceUser {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl PresenceUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self { user_id: Some(user_id.into()), name: None, role: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Returns `None` when the heartbeat has no usable user id.
    /// Missing display fields fall back to placeholders.
    pub fn normalize(&self) -> Option<NormalizedUser> {
        let user_id = non_blank(self.user_id.as_deref())?;
        Some(NormalizedUser {
            user_id: user_id.to_string(),
            name: non_blank(self.name.as_deref()).unwrap_or(UNKNOWN_NAME).to_string(),
            role: non_blank(self.role.as_deref()).unwrap_or(UNKNOWN_ROLE).to_string(),
        })
    }
}

/// A heartbeat that passed normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUser {
    pub user_id: String,
    pub name: String,
    pub role: String,
}

impl NormalizedUser {
    pub fn into_entry(self, last_seen: DateTime<Utc>) -> PresenceEntry {
        PresenceEntry { user_id: self.user_id, name: self.name, role: self.role, last_seen }
    }
}

/// One user's last-known liveness in one room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceEntry {
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub last_seen: DateTime<Utc>,
}

impl PresenceEntry {
    /// Live iff `now - last_seen <= ttl`. A `last_seen` in the future counts as live.
    pub fn is_live_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.last_seen).to_std() {
            Ok(age) => age <= ttl,
            Err(_) => true,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
