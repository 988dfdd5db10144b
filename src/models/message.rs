use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A visitor-submitted record. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    /// 1-based, assigned by the store in insertion order.
    pub id: u64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Cloud instance id of the host that accepted the record.
    pub server_id: String,
}

/// Everything about a message except the id, which only the store may assign.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub server_id: String,
}

impl NewMessage {
    pub fn into_message(self, id: u64) -> Message {
        Message {
            id,
            name: self.name,
            email: self.email,
            message: self.message,
            timestamp: self.timestamp,
            server_id: self.server_id,
        }
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl CreateMessage {
    pub fn stamp(self, server_id: impl Into<String>) -> NewMessage {
        NewMessage {
            name: self.name,
            email: self.email,
            message: self.message,
            timestamp: Utc::now(),
            server_id: server_id.into(),
        }
    }
}
