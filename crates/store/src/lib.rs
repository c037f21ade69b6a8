//! Durable local persistence for StudySync
//!
//! This crate owns the on-disk key-value namespace the sync engine runs
//! against: the canonical study snapshot, the offline mutation queue, the
//! dead-letter set, and sync metadata. Every write is atomic (temp file +
//! rename) so a crash mid-write never leaves a torn file, and all writes
//! are serialized behind a single mutex so concurrent callers block
//! rather than race.

mod error;
mod local;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
