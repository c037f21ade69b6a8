//! Domain types for StudySync
//!
//! This module contains the data model organized by responsibility:
//! - `record`: identity-bearing study records and the `SyncRecord` trait
//! - `snapshot`: the canonical `StudySnapshot`
//! - `queue`: offline mutation queue items
//! - `metadata`: persisted sync bookkeeping

mod metadata;
mod queue;
mod record;
mod snapshot;

// Re-export all public types
pub use metadata::SyncMetadata;
pub use queue::{HttpMethod, OfflineQueueItem};
pub use record::{Goal, QuizResult, Schedule, SyncRecord};
pub use snapshot::StudySnapshot;
