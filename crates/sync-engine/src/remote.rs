//! Remote API seam used by the coordinator and queue
//!
//! The trait keeps the engine testable against in-memory stubs; the
//! production implementation delegates to `studysync_network::ApiClient`.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use studysync_core::OfflineQueueItem;
use studysync_network::{ApiClient, NetworkError};

/// The remote study API as the engine sees it
#[async_trait]
pub trait StudyApi: Send + Sync {
    /// Fetches the remote study snapshot as raw JSON
    async fn fetch_snapshot(&self) -> SyncResult<serde_json::Value>;

    /// Replays one queued mutation against the server
    async fn deliver(&self, item: &OfflineQueueItem) -> SyncResult<()>;
}

#[async_trait]
impl StudyApi for ApiClient {
    async fn fetch_snapshot(&self) -> SyncResult<serde_json::Value> {
        self.fetch_study_data().await.map_err(into_sync_error)
    }

    async fn deliver(&self, item: &OfflineQueueItem) -> SyncResult<()> {
        self.execute(item.method, &item.endpoint, &item.payload)
            .await
            .map_err(into_sync_error)
    }
}

fn into_sync_error(err: NetworkError) -> SyncError {
    if err.is_connectivity() {
        SyncError::Connectivity(err.to_string())
    } else {
        SyncError::Remote(err.to_string())
    }
}
