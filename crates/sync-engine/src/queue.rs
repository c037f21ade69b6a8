//! Durable offline mutation queue
//!
//! Mutations issued while offline (or while a sync holds the cycle lock)
//! are appended here and replayed against the remote API on reconnect.
//! Draining is strictly FIFO: a stuck item stops the cycle so a later
//! mutation can never land before an earlier one it may depend on.

use crate::error::SyncResult;
use crate::remote::StudyApi;
use std::sync::Arc;
use studysync_core::{HttpMethod, OfflineQueueItem};
use studysync_store::LocalStore;

/// Queue configuration
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Delivery attempts before an item is dead-lettered
    pub max_attempts: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl QueueConfig {
    /// Sets the attempt budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// A single failed delivery, surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItemFailure {
    pub id: String,
    pub attempts: u32,
    pub message: String,
}

/// Outcome of one drain cycle
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    /// Items delivered and removed from the queue
    pub delivered: usize,
    /// Items moved to the dead-letter set this cycle
    pub dead_lettered: Vec<String>,
    /// The item that stopped the cycle, if any
    pub failed: Option<QueueItemFailure>,
    /// Items still pending after the cycle
    pub remaining: usize,
}

impl DrainReport {
    /// Returns true if nothing is left pending
    pub fn fully_drained(&self) -> bool {
        self.remaining == 0
    }
}

/// Append-only, durable, ordered queue of pending writes
pub struct OfflineQueue {
    store: Arc<LocalStore>,
    config: QueueConfig,
}

impl OfflineQueue {
    /// Creates a queue backed by the given store
    pub fn new(store: Arc<LocalStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// Captures a mutation for later replay
    ///
    /// Synchronous, so a write path can enqueue and update the UI
    /// optimistically without waiting on the network.
    pub fn enqueue(
        &self,
        method: HttpMethod,
        endpoint: String,
        payload: serde_json::Value,
    ) -> SyncResult<OfflineQueueItem> {
        let item = OfflineQueueItem::new(method, endpoint, payload);
        self.store.append_queue(&item)?;
        log::debug!("Queued {} {} as {}", item.method, item.endpoint, item.id);
        Ok(item)
    }

    /// Replays pending items in FIFO order
    ///
    /// Stops at the first failure to preserve ordering; an item that
    /// exhausts its attempt budget is moved to the dead-letter set and
    /// also stops the cycle. Draining an empty queue is a no-op.
    pub async fn drain(&self, api: &dyn StudyApi) -> SyncResult<DrainReport> {
        let items = self.store.load_queue()?;
        let mut report = DrainReport::default();

        for mut item in items {
            match api.deliver(&item).await {
                Ok(()) => {
                    self.store.remove_queue_item(&item.id)?;
                    report.delivered += 1;
                }
                Err(err) => {
                    item.record_attempt();
                    if item.attempts >= self.config.max_attempts {
                        log::warn!(
                            "Queue item {} dead-lettered after {} attempts: {}",
                            item.id,
                            item.attempts,
                            err
                        );
                        self.store.remove_queue_item(&item.id)?;
                        self.store.append_dead_letter(&item)?;
                        report.dead_lettered.push(item.id.clone());
                    } else {
                        log::warn!(
                            "Queue item {} failed (attempt {}): {}",
                            item.id,
                            item.attempts,
                            err
                        );
                        self.store.update_queue_item(&item)?;
                        report.failed = Some(QueueItemFailure {
                            id: item.id.clone(),
                            attempts: item.attempts,
                            message: err.to_string(),
                        });
                    }
                    break;
                }
            }
        }

        report.remaining = self.store.load_queue()?.len();
        Ok(report)
    }

    /// Number of items still pending
    pub fn pending_count(&self) -> SyncResult<usize> {
        Ok(self.store.load_queue()?.len())
    }

    /// Number of permanently failed items
    pub fn dead_letter_count(&self) -> SyncResult<usize> {
        Ok(self.store.load_dead_letters()?.len())
    }
}
