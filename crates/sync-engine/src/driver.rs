//! Glue between the network monitor and the sync coordinator
//!
//! Runs for the process lifetime: every debounced reconnect the monitor
//! reports turns into a sync cycle, and offline transitions are forwarded
//! so the coordinator records them. The driver exits on `shutdown` or
//! when the monitor's event channel closes.

use crate::coordinator::SyncCoordinator;
use std::sync::Arc;
use studysync_network::{NetworkEvent, NetworkMonitor};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Background task that turns connectivity events into sync cycles
pub struct SyncDriver {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncDriver {
    /// Spawns a driver consuming the given monitor's events
    pub fn spawn(coordinator: Arc<SyncCoordinator>, monitor: &NetworkMonitor) -> Self {
        Self::spawn_with_events(coordinator, monitor.subscribe())
    }

    /// Spawns a driver over an explicit event stream
    pub fn spawn_with_events(
        coordinator: Arc<SyncCoordinator>,
        mut events: broadcast::Receiver<NetworkEvent>,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Ok(NetworkEvent::SyncRequested) => {
                            if let Err(err) = coordinator.request_sync(true).await {
                                log::warn!("Reconnect sync failed: {}", err);
                            }
                        }
                        Ok(NetworkEvent::Offline) => {
                            if let Err(err) = coordinator.request_sync(false).await {
                                log::warn!("Offline handling failed: {}", err);
                            }
                        }
                        // Online is always followed by SyncRequested
                        Ok(NetworkEvent::Online) => {}
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            log::warn!("Dropped {} network events", missed);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, task }
    }

    /// Stops the driver and waits for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::CoordinatorConfig;
    use crate::error::SyncResult;
    use crate::remote::StudyApi;
    use async_trait::async_trait;
    use std::time::Duration;
    use studysync_core::OfflineQueueItem;
    use studysync_store::LocalStore;
    use tempfile::TempDir;

    struct EmptyApi;

    #[async_trait]
    impl StudyApi for EmptyApi {
        async fn fetch_snapshot(&self) -> SyncResult<serde_json::Value> {
            Ok(serde_json::json!({}))
        }

        async fn deliver(&self, _item: &OfflineQueueItem) -> SyncResult<()> {
            Ok(())
        }
    }

    fn test_coordinator() -> (TempDir, Arc<SyncCoordinator>) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(LocalStore::open(dir.path().join("data")));
        let coordinator =
            SyncCoordinator::new(store, Arc::new(EmptyApi), CoordinatorConfig::default()).unwrap();
        (dir, Arc::new(coordinator))
    }

    #[tokio::test]
    async fn test_sync_requested_event_runs_a_cycle() {
        let (_dir, coordinator) = test_coordinator();
        let (sender, _) = broadcast::channel(16);
        let driver = SyncDriver::spawn_with_events(Arc::clone(&coordinator), sender.subscribe());

        sender.send(NetworkEvent::SyncRequested).unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while coordinator.snapshot().unwrap().last_sync_time.is_none() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "event never triggered a sync"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        driver.shutdown().await;
    }

    #[tokio::test]
    async fn test_driver_exits_when_channel_closes() {
        let (_dir, coordinator) = test_coordinator();
        let (sender, receiver) = broadcast::channel(16);
        let driver = SyncDriver::spawn_with_events(coordinator, receiver);

        drop(sender);

        tokio::time::timeout(Duration::from_secs(1), driver.task)
            .await
            .expect("driver should stop once the channel closes")
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_driver() {
        let (_dir, coordinator) = test_coordinator();
        let (_sender, receiver) = broadcast::channel::<NetworkEvent>(16);
        let driver = SyncDriver::spawn_with_events(coordinator, receiver);

        tokio::time::timeout(Duration::from_secs(1), driver.shutdown())
            .await
            .expect("shutdown should not hang");
    }
}
