//! Sync coordinator state machine
//!
//! Orchestrates the full cycle: load local, fetch remote (if online),
//! merge, persist, drain the offline queue, update metadata. At most one
//! cycle runs at a time; every exit path, including errors, lands the
//! machine back in `Idle`.

use crate::error::{SyncError, SyncResult};
use crate::merge::{merge, RemoteSnapshot};
use crate::queue::{DrainReport, OfflineQueue, QueueConfig};
use crate::remote::StudyApi;
use crate::streak::{quote_is_stale, streak_transition, StreakTransition};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use studysync_core::{HttpMethod, OfflineQueueItem, StudySnapshot};
use studysync_store::LocalStore;

/// Where the coordinator currently is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No cycle in flight
    Idle,
    /// Last cycle found no usable connectivity
    Offline,
    /// Loading local state and fetching the remote snapshot
    Syncing,
    /// Combining local and remote state
    Merging,
    /// Replaying the offline mutation queue
    Draining,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Offline => write!(f, "Offline"),
            Self::Syncing => write!(f, "Syncing"),
            Self::Merging => write!(f, "Merging"),
            Self::Draining => write!(f, "Draining"),
        }
    }
}

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Bound on the remote snapshot fetch; exceeding it is an offline
    /// signal, not a fault
    pub fetch_timeout: Duration,
    /// Queue settings for the drain phase
    pub queue: QueueConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            queue: QueueConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Sets the remote fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the queue configuration
    pub fn with_queue(mut self, queue: QueueConfig) -> Self {
        self.queue = queue;
        self
    }
}

/// Outcome of one `request_sync` call
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Another cycle held the lock; this request was a no-op
    pub already_in_flight: bool,
    /// The cycle found no usable connectivity and kept local state
    pub went_offline: bool,
    /// A remote snapshot was merged
    pub merged: bool,
    /// The remote payload was malformed; the local snapshot won
    pub merge_rejected: bool,
    /// Queue drain outcome, when the cycle got that far
    pub drain: Option<DrainReport>,
}

impl SyncReport {
    fn already_in_flight() -> Self {
        Self {
            already_in_flight: true,
            ..Self::default()
        }
    }
}

/// Result of a day-boundary refresh
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyRefresh {
    /// The streak was zeroed because a day was missed
    pub streak_reset: bool,
    /// The quote of the day has not been refreshed today
    pub quote_stale: bool,
}

/// Resets the phase to `Idle` when the cycle ends, however it ends
struct PhaseReset<'a>(&'a Mutex<SyncPhase>);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        if let Ok(mut phase) = self.0.lock() {
            *phase = SyncPhase::Idle;
        }
    }
}

/// Orchestrates sync cycles over the local store and remote API
///
/// Constructed once at app start and passed by reference; `reset` is the
/// logout teardown. UI code reads snapshot copies through it and issues
/// writes through `enqueue_mutation`/`apply_study_session`, never by
/// mutating fields directly. Every load-modify-persist sequence on the
/// snapshot holds the write lock, so a session recorded while a sync
/// cycle is merging is never overwritten by the cycle's persist.
pub struct SyncCoordinator {
    store: Arc<LocalStore>,
    api: Arc<dyn StudyApi>,
    queue: OfflineQueue,
    snapshot: Mutex<StudySnapshot>,
    /// Serializes snapshot load-modify-persist sequences; never held
    /// across an await
    write: Mutex<()>,
    phase: Mutex<SyncPhase>,
    cycle: tokio::sync::Mutex<()>,
    config: CoordinatorConfig,
}

impl SyncCoordinator {
    /// Creates a coordinator, hydrating the snapshot from the store
    pub fn new(
        store: Arc<LocalStore>,
        api: Arc<dyn StudyApi>,
        config: CoordinatorConfig,
    ) -> SyncResult<Self> {
        let snapshot = store.load_snapshot()?.unwrap_or_default();
        let queue = OfflineQueue::new(Arc::clone(&store), config.queue.clone());

        Ok(Self {
            store,
            api,
            queue,
            snapshot: Mutex::new(snapshot),
            write: Mutex::new(()),
            phase: Mutex::new(SyncPhase::Idle),
            cycle: tokio::sync::Mutex::new(()),
            config,
        })
    }

    /// Current cycle phase
    pub fn phase(&self) -> SyncResult<SyncPhase> {
        self.phase
            .lock()
            .map(|p| *p)
            .map_err(|_| SyncError::LockPoisoned)
    }

    /// A copy of the in-memory canonical snapshot (non-blocking for UI)
    pub fn snapshot(&self) -> SyncResult<StudySnapshot> {
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .map_err(|_| SyncError::LockPoisoned)
    }

    /// The offline mutation queue
    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    /// Runs one sync cycle, or no-ops if one is already in flight
    ///
    /// `online` is the Network Monitor's current view; passing `false`
    /// records the `Offline` phase and preserves all local state.
    pub async fn request_sync(&self, online: bool) -> SyncResult<SyncReport> {
        let Ok(_cycle) = self.cycle.try_lock() else {
            log::debug!("Sync already in flight; request ignored");
            return Ok(SyncReport::already_in_flight());
        };
        let _reset = PhaseReset(&self.phase);
        let mut report = SyncReport::default();

        if !online {
            self.set_phase(SyncPhase::Offline);
            log::info!("Offline; keeping local state and pending queue");
            report.went_offline = true;
            return Ok(report);
        }

        self.set_phase(SyncPhase::Syncing);
        let fetched =
            tokio::time::timeout(self.config.fetch_timeout, self.api.fetch_snapshot()).await;
        let value = match fetched {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => {
                self.set_phase(SyncPhase::Offline);
                log::warn!("Remote fetch failed, treating as offline: {}", err);
                report.went_offline = true;
                return Ok(report);
            }
            Err(_) => {
                self.set_phase(SyncPhase::Offline);
                log::warn!(
                    "Remote fetch exceeded {:?}, treating as offline",
                    self.config.fetch_timeout
                );
                report.went_offline = true;
                return Ok(report);
            }
        };

        self.set_phase(SyncPhase::Merging);
        {
            // Load-merge-persist runs under the write lock: a UI write
            // either lands before the load and becomes merge input, or
            // waits for the persist. Nothing in between can be lost.
            let _write = self.write_guard()?;
            let local = self.store.load_snapshot()?.unwrap_or_default();
            let merged = match RemoteSnapshot::from_value(value) {
                Ok(remote) => {
                    report.merged = true;
                    merge(&local, &remote, Utc::now())
                }
                Err(err) => {
                    log::warn!("Remote payload rejected, local snapshot wins: {}", err);
                    report.merge_rejected = true;
                    local
                }
            };
            self.store.save_snapshot(&merged)?;
            self.update_cache(merged)?;
        }

        self.set_phase(SyncPhase::Draining);
        let drain_result = self.queue.drain(self.api.as_ref()).await;

        // Metadata is updated whatever the drain's outcome
        let mut metadata = self.store.load_metadata()?;
        metadata.last_sync_time = Some(Utc::now());
        self.store.save_metadata(&metadata)?;

        let drain = drain_result?;
        log::info!(
            "Sync cycle complete: {} delivered, {} pending",
            drain.delivered,
            drain.remaining
        );
        report.drain = Some(drain);
        Ok(report)
    }

    /// Records a study session: tallies minutes, advances the streak,
    /// and queues the mutation for replay
    ///
    /// This is the UI write path; it works identically online and
    /// offline, and repeated sessions on the same day never double-count
    /// the streak.
    pub fn apply_study_session(
        &self,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> SyncResult<OfflineQueueItem> {
        let today = now.date_naive();
        let _write = self.write_guard()?;
        let mut metadata = self.store.load_metadata()?;
        let transition = streak_transition(metadata.last_study_date, today);

        let mut snapshot = self.snapshot()?;
        snapshot.log_study_minutes(minutes, now);
        snapshot.streak = match transition {
            StreakTransition::Keep => snapshot.streak,
            StreakTransition::Extend => snapshot.streak.saturating_add(1),
            // A session today always counts; a broken streak restarts at 1
            StreakTransition::Start | StreakTransition::Reset => 1,
        };
        metadata.last_study_date = Some(today);

        self.store.save_snapshot(&snapshot)?;
        self.store.save_metadata(&metadata)?;
        self.update_cache(snapshot)?;

        self.queue.enqueue(
            HttpMethod::Post,
            "/study/sessions".to_string(),
            serde_json::json!({ "minutes": minutes, "date": now.to_rfc3339() }),
        )
    }

    /// Re-derives day-boundary state on app open
    ///
    /// Zeroes the streak if a day was missed and reports whether the
    /// quote of the day is due a refresh. Idempotent per calendar day.
    pub fn refresh_daily_state(&self, today: NaiveDate) -> SyncResult<DailyRefresh> {
        let _write = self.write_guard()?;
        let metadata = self.store.load_metadata()?;
        let mut refresh = DailyRefresh {
            quote_stale: quote_is_stale(metadata.last_quote_date, today),
            ..DailyRefresh::default()
        };

        if streak_transition(metadata.last_study_date, today) == StreakTransition::Reset {
            let mut snapshot = self.snapshot()?;
            if snapshot.streak != 0 {
                snapshot.streak = 0;
                self.store.save_snapshot(&snapshot)?;
                self.update_cache(snapshot)?;
                refresh.streak_reset = true;
                log::info!("Streak reset: a study day was missed");
            }
        }

        Ok(refresh)
    }

    /// Stores a fresh quote of the day, at most once per calendar day
    pub fn set_today_quote(&self, quote: String, today: NaiveDate) -> SyncResult<()> {
        let _write = self.write_guard()?;
        let mut metadata = self.store.load_metadata()?;
        if !quote_is_stale(metadata.last_quote_date, today) {
            log::debug!("Quote already refreshed today; ignoring");
            return Ok(());
        }

        let mut snapshot = self.snapshot()?;
        snapshot.today_quote = Some(quote);
        metadata.last_quote_date = Some(today);

        self.store.save_snapshot(&snapshot)?;
        self.store.save_metadata(&metadata)?;
        self.update_cache(snapshot)
    }

    /// Captures an arbitrary write-path mutation for replay
    pub fn enqueue_mutation(
        &self,
        method: HttpMethod,
        endpoint: String,
        payload: serde_json::Value,
    ) -> SyncResult<OfflineQueueItem> {
        self.queue.enqueue(method, endpoint, payload)
    }

    /// Logout: wipes the persisted namespace and in-memory state
    pub fn reset(&self) -> SyncResult<()> {
        let _write = self.write_guard()?;
        self.store.reset()?;
        self.update_cache(StudySnapshot::default())
    }

    fn write_guard(&self) -> SyncResult<MutexGuard<'_, ()>> {
        self.write.lock().map_err(|_| SyncError::LockPoisoned)
    }

    fn set_phase(&self, phase: SyncPhase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    fn update_cache(&self, snapshot: StudySnapshot) -> SyncResult<()> {
        let mut cache = self.snapshot.lock().map_err(|_| SyncError::LockPoisoned)?;
        *cache = snapshot;
        Ok(())
    }
}
