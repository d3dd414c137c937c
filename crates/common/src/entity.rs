// Externally-owned records the daemon watches for status transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record owned by the acting user, as returned by the data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchedEntity {
    pub id: String,
    /// Raw status string. Only a few values are meaningful, see [`EntityStatus`].
    pub status: String,
    #[serde(default, alias = "assigneeName")]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "statusTimestamps")]
    pub status_timestamps: StatusTimestamps,
    #[serde(alias = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl WatchedEntity {
    pub fn classify(&self) -> EntityStatus {
        EntityStatus::classify(&self.status)
    }

    /// Trimmed assignee name, `None` when absent or blank.
    pub fn assignee(&self) -> Option<&str> {
        self.assignee_name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }

    pub fn notified_key(&self) -> NotifiedKey {
        NotifiedKey { entity_id: self.id.clone(), status: self.status.clone() }
    }
}

/// When the entity entered its watched statuses, if the source recorded it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusTimestamps {
    #[serde(default, alias = "acceptedAt")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "resolvedAt")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Status vocabulary the daemon reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStatus {
    InProgress,
    Resolved,
    Other,
}

impl EntityStatus {
    pub fn classify(raw: &str) -> Self {
        match raw.trim() {
            "in-progress" | "in_progress" => Self::InProgress,
            "resolved" => Self::Resolved,
            _ => Self::Other,
        }
    }
}

/// `(entity id, raw status)`: one notification at most per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotifiedKey {
    pub entity_id: String,
    pub status: String,
}
