//! Identity-bearing study records
//!
//! Every record carries a globally unique `id` (client- or server-assigned)
//! and an ordering field used by the merge engine for last-writer-wins
//! deduplication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a new client-side record id
pub(crate) fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// A record that can be deduplicated and ordered by the merge engine
pub trait SyncRecord {
    /// Globally unique record identity
    fn id(&self) -> &str;

    /// The field used for last-writer-wins comparison
    fn ordering_key(&self) -> DateTime<Utc>;
}

/// Result of a completed quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: String,
    pub subject: String,
    pub score: u32,
    pub total: u32,
    /// When the quiz was taken; ordering field for merge
    pub date: DateTime<Utc>,
}

impl QuizResult {
    /// Creates a new locally recorded quiz result
    pub fn new(subject: String, score: u32, total: u32, date: DateTime<Utc>) -> Self {
        Self {
            id: new_record_id(),
            subject,
            score,
            total,
            date,
        }
    }

    /// Returns the score as a percentage (0.0 - 100.0)
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        f64::from(self.score) / f64::from(self.total) * 100.0
    }
}

impl SyncRecord for QuizResult {
    fn id(&self) -> &str {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.date
    }
}

/// A study goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub completed: bool,
    /// Last modification time; ordering field for merge
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Creates a new open goal
    pub fn new(title: String, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: new_record_id(),
            title,
            completed: false,
            updated_at,
        }
    }

    /// Marks the goal as completed
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.updated_at = now;
    }
}

impl SyncRecord for Goal {
    fn id(&self) -> &str {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// An upcoming study schedule entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub title: String,
    /// Planned start time; ordering field for merge
    pub start_time: DateTime<Utc>,
    /// Planned length in minutes
    pub duration_minutes: u32,
}

impl Schedule {
    /// Creates a new schedule entry
    pub fn new(title: String, start_time: DateTime<Utc>, duration_minutes: u32) -> Self {
        Self {
            id: new_record_id(),
            title,
            start_time,
            duration_minutes,
        }
    }
}

impl SyncRecord for Schedule {
    fn id(&self) -> &str {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.start_time
    }
}
