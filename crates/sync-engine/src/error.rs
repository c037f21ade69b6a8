//! Error types for sync operations

use studysync_store::StoreError;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during synchronization
///
/// All of these are caught at the coordinator boundary; none of them may
/// wedge the state machine outside `Idle`.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transient connectivity failure; flips the cycle into offline
    /// handling and never drops data
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The remote payload was malformed; the local snapshot wins
    #[error("Malformed remote payload: {0}")]
    MergeData(String),

    /// The server rejected a request for a non-transport reason
    #[error("Remote API error: {0}")]
    Remote(String),

    /// A queued mutation exhausted its attempt budget
    #[error("Queue item {id} dead-lettered after {attempts} attempts")]
    DeadLettered { id: String, attempts: u32 },

    /// Local persistence failed; never silently swallowed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// An in-memory lock was poisoned by a panicking writer
    #[error("Sync state lock poisoned")]
    LockPoisoned,
}
