//! Offline mutation queue items

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HTTP method of a queued mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A mutation captured while offline or while a sync was in flight
///
/// The `id` is client-generated and doubles as the idempotency key the
/// server deduplicates on, so replaying a delivered item is harmless.
/// Items are immutable except for the `attempts` counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineQueueItem {
    pub id: String,
    pub method: HttpMethod,
    pub endpoint: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub attempts: u32,
}

impl OfflineQueueItem {
    /// Creates a new queue item with a fresh idempotency key
    pub fn new(method: HttpMethod, endpoint: String, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            method,
            endpoint,
            payload,
            created_at: Utc::now(),
            attempts: 0,
        }
    }

    /// Records one failed delivery attempt
    pub fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }
}
