//! Shared data model for the StudySync offline-first engine
//!
//! This crate holds the canonical study state and the records that flow
//! between the local store, the merge engine, and the remote API:
//! - `StudySnapshot`: the per-user canonical study state
//! - `QuizResult`, `Goal`, `Schedule`: identity-bearing study records
//! - `OfflineQueueItem`: a pending mutation captured while offline
//! - `SyncMetadata`: persisted sync/day-boundary bookkeeping
//!
//! All types serialize with camelCase field names so the on-disk layout
//! matches the JSON the remote API speaks.

pub mod types;

// Re-export commonly used types
pub use types::{
    Goal, HttpMethod, OfflineQueueItem, QuizResult, Schedule, StudySnapshot, SyncMetadata,
    SyncRecord,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _snapshot = StudySnapshot::default();
        let _metadata = SyncMetadata::default();
        let _method = HttpMethod::Post;
    }
}
