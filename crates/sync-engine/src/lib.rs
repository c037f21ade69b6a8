//! Offline-first synchronization engine for study data
//!
//! Ties the local store, remote API, and merge rules together behind a
//! single coordinator. The engine owns the full sync cycle: fetch the
//! remote snapshot, merge it with local state, persist the result, and
//! replay the offline mutation queue in order. The device copy is always
//! usable; the network only ever improves it.
//!
//! The merge itself is a pure function and can be used standalone:
//!
//! ```
//! use chrono::Utc;
//! use studysync_core::StudySnapshot;
//! use studysync_engine::{merge, RemoteSnapshot};
//!
//! let local = StudySnapshot::default();
//! let remote = RemoteSnapshot::from_value(serde_json::json!({
//!     "dailyTime": 45,
//!     "streak": 3,
//! })).unwrap();
//!
//! let merged = merge(&local, &remote, Utc::now());
//! assert_eq!(merged.daily_time, 45);
//! assert_eq!(merged.streak, 3);
//! ```

pub mod coordinator;
pub mod driver;
pub mod error;
pub mod merge;
pub mod queue;
pub mod remote;
pub mod streak;

pub use coordinator::{
    CoordinatorConfig, DailyRefresh, SyncCoordinator, SyncPhase, SyncReport,
};
pub use driver::SyncDriver;
pub use error::{SyncError, SyncResult};
pub use merge::{merge, merge_records, RemoteSnapshot};
pub use queue::{DrainReport, OfflineQueue, QueueConfig, QueueItemFailure};
pub use remote::StudyApi;
pub use streak::{quote_is_stale, streak_transition, StreakTransition};
