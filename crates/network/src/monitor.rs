//! Background connectivity monitor with debounced transitions
//!
//! The monitor polls a `ConnectivityChecker` for the process lifetime and
//! publishes transitions on a broadcast channel. An offline-to-online edge
//! is only reported after the link has stayed up for the debounce window,
//! so a flapping link cannot thrash the sync coordinator; going offline is
//! reported immediately. Every debounced reconnect also emits a
//! `SyncRequested` event for the coordinator to consume.

use crate::connectivity::ConnectivityChecker;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How often connectivity is sampled
    pub poll_interval: Duration,
    /// How long the link must stay up before an online edge is reported
    pub debounce: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            debounce: Duration::from_secs(2),
        }
    }
}

impl MonitorConfig {
    /// Sets the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Connectivity events published by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    /// The link came up and stayed up through the debounce window
    Online,
    /// The link went down
    Offline,
    /// A sync should run now (follows every debounced `Online`)
    SyncRequested,
}

/// A reported connectivity transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOnline,
    WentOffline,
}

/// Pure debounce state machine over sampled connectivity
///
/// Feeding it samples yields at most one transition per edge. Kept free
/// of I/O so the debounce rules are testable with injected instants.
#[derive(Debug)]
pub struct DebounceState {
    online: bool,
    candidate_since: Option<Instant>,
    debounce: Duration,
}

impl DebounceState {
    /// Creates a new state machine, initially offline
    pub fn new(debounce: Duration) -> Self {
        Self {
            online: false,
            candidate_since: None,
            debounce,
        }
    }

    /// Returns the last reported connectivity
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Feeds one connectivity sample taken at `now`
    pub fn sample(&mut self, up: bool, now: Instant) -> Option<Transition> {
        match (self.online, up) {
            (false, true) => match self.candidate_since {
                Some(since) if now.duration_since(since) >= self.debounce => {
                    self.online = true;
                    self.candidate_since = None;
                    Some(Transition::WentOnline)
                }
                Some(_) => None,
                None => {
                    self.candidate_since = Some(now);
                    None
                }
            },
            (false, false) => {
                // A down sample restarts the debounce window
                self.candidate_since = None;
                None
            }
            (true, false) => {
                self.online = false;
                self.candidate_since = None;
                Some(Transition::WentOffline)
            }
            (true, true) => None,
        }
    }
}

/// Background connectivity observer
///
/// `init` is `spawn` at app start; `teardown` is `shutdown` at app exit.
/// Dropping the monitor without `shutdown` detaches the poll task, which
/// stops at the next tick once the shutdown channel closes.
pub struct NetworkMonitor {
    online: Arc<AtomicBool>,
    events: broadcast::Sender<NetworkEvent>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl NetworkMonitor {
    /// Spawns a monitor polling the given checker
    pub fn spawn(checker: ConnectivityChecker, config: MonitorConfig) -> Self {
        Self::spawn_with_probe(move || {
            let checker = checker.clone();
            async move { checker.is_online().await }
        }, config)
    }

    /// Spawns a monitor with a custom connectivity probe
    pub fn spawn_with_probe<F, Fut>(mut probe: F, config: MonitorConfig) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send,
    {
        let online = Arc::new(AtomicBool::new(false));
        let (events, _) = broadcast::channel(16);
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task_online = Arc::clone(&online);
        let task_events = events.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.poll_interval);
            let mut state = DebounceState::new(config.debounce);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let up = probe().await;
                        match state.sample(up, Instant::now()) {
                            Some(Transition::WentOnline) => {
                                log::info!("Connectivity restored, requesting sync");
                                task_online.store(true, Ordering::SeqCst);
                                let _ = task_events.send(NetworkEvent::Online);
                                let _ = task_events.send(NetworkEvent::SyncRequested);
                            }
                            Some(Transition::WentOffline) => {
                                log::info!("Connectivity lost");
                                task_online.store(false, Ordering::SeqCst);
                                let _ = task_events.send(NetworkEvent::Offline);
                            }
                            None => {}
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            online,
            events,
            shutdown,
            task,
        }
    }

    /// Current connectivity as last reported by the debounce machine
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Subscribes to connectivity events
    ///
    /// Dropping the receiver unsubscribes; nothing leaks across app
    /// lifecycle transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.events.subscribe()
    }

    /// Stops the poll task and waits for it to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_secs(2);

    fn instants(start: Instant) -> impl Fn(u64) -> Instant {
        move |millis| start + Duration::from_millis(millis)
    }

    fn fast_config() -> MonitorConfig {
        let _ = env_logger::builder().is_test(true).try_init();
        MonitorConfig::default()
            .with_poll_interval(Duration::from_millis(10))
            .with_debounce(Duration::from_millis(25))
    }

    #[test]
    fn test_starts_offline() {
        let state = DebounceState::new(DEBOUNCE);
        assert!(!state.is_online());
    }

    #[test]
    fn test_online_edge_waits_for_debounce() {
        let mut state = DebounceState::new(DEBOUNCE);
        let at = instants(Instant::now());

        assert_eq!(state.sample(true, at(0)), None);
        assert_eq!(state.sample(true, at(1000)), None);
        assert_eq!(state.sample(true, at(2000)), Some(Transition::WentOnline));
        assert!(state.is_online());
    }

    #[test]
    fn test_flap_resets_debounce_window() {
        let mut state = DebounceState::new(DEBOUNCE);
        let at = instants(Instant::now());

        assert_eq!(state.sample(true, at(0)), None);
        assert_eq!(state.sample(false, at(1000)), None);
        // Window restarts; 2s from the new candidate, not the first
        assert_eq!(state.sample(true, at(1500)), None);
        assert_eq!(state.sample(true, at(3000)), None);
        assert_eq!(state.sample(true, at(3500)), Some(Transition::WentOnline));
    }

    #[test]
    fn test_offline_edge_is_immediate() {
        let mut state = DebounceState::new(DEBOUNCE);
        let at = instants(Instant::now());

        state.sample(true, at(0));
        state.sample(true, at(2000));
        assert!(state.is_online());

        assert_eq!(state.sample(false, at(2500)), Some(Transition::WentOffline));
        assert!(!state.is_online());
    }

    #[test]
    fn test_stable_states_emit_nothing() {
        let mut state = DebounceState::new(DEBOUNCE);
        let at = instants(Instant::now());

        assert_eq!(state.sample(false, at(0)), None);
        state.sample(true, at(1000));
        state.sample(true, at(3000));
        assert_eq!(state.sample(true, at(4000)), None);
    }

    #[tokio::test]
    async fn test_monitor_emits_sync_requested_on_reconnect() {
        let monitor = NetworkMonitor::spawn_with_probe(|| async { true }, fast_config());
        let mut events = monitor.subscribe();

        let online = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("timed out waiting for online event")
            .unwrap();
        assert_eq!(online, NetworkEvent::Online);

        let requested = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("timed out waiting for sync request")
            .unwrap();
        assert_eq!(requested, NetworkEvent::SyncRequested);
        assert!(monitor.is_online());

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_monitor_stays_silent_while_offline() {
        let monitor = NetworkMonitor::spawn_with_probe(|| async { false }, fast_config());
        let mut events = monitor.subscribe();

        let result = tokio::time::timeout(Duration::from_millis(100), events.recv()).await;
        assert!(result.is_err(), "offline link should emit no events");
        assert!(!monitor.is_online());

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let monitor = NetworkMonitor::spawn_with_probe(|| async { true }, fast_config());

        // Must complete promptly rather than hang
        tokio::time::timeout(Duration::from_secs(1), monitor.shutdown())
            .await
            .expect("shutdown should not hang");
    }
}
