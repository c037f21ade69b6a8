//! File-backed local store
//!
//! One JSON file per conceptual key:
//! - `study_data.json`: the canonical `StudySnapshot`
//! - `offline_queue.json`: ordered pending mutations
//! - `dead_letter.json`: mutations that exhausted their attempt budget
//! - `sync_metadata.json`: last-sync / last-study / last-quote bookkeeping
//!
//! Writes go to a temp file in the same directory and are renamed into
//! place, so readers never observe a half-written snapshot.

use crate::error::{StoreError, StoreResult};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use studysync_core::{OfflineQueueItem, StudySnapshot, SyncMetadata};
use tempfile::NamedTempFile;

const SNAPSHOT_FILE: &str = "study_data.json";
const QUEUE_FILE: &str = "offline_queue.json";
const DEAD_LETTER_FILE: &str = "dead_letter.json";
const METADATA_FILE: &str = "sync_metadata.json";

/// Durable key-value store for the study namespace
///
/// All mutating operations are serialized behind a single mutex;
/// concurrent callers block rather than race.
pub struct LocalStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl LocalStore {
    /// Opens a store rooted at the given directory
    pub fn open(dir: PathBuf) -> Self {
        Self {
            dir,
            lock: Mutex::new(()),
        }
    }

    /// Opens a store in the platform data directory
    ///
    /// - Linux: `~/.local/share/studysync/`
    /// - macOS: `~/Library/Application Support/studysync/`
    /// - Windows: `%APPDATA%\studysync\data\`
    pub fn open_default() -> StoreResult<Self> {
        let dirs = ProjectDirs::from("", "", "studysync").ok_or_else(|| {
            StoreError::PathResolution {
                reason: "Could not determine user data directory".to_string(),
            }
        })?;
        Ok(Self::open(dirs.data_dir().to_path_buf()))
    }

    /// Returns the directory this store persists into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads the canonical snapshot, or `None` if one was never saved
    pub fn load_snapshot(&self) -> StoreResult<Option<StudySnapshot>> {
        let _guard = self.guard()?;
        self.read_json(SNAPSHOT_FILE)
    }

    /// Persists the canonical snapshot atomically
    pub fn save_snapshot(&self, snapshot: &StudySnapshot) -> StoreResult<()> {
        let _guard = self.guard()?;
        self.write_json(SNAPSHOT_FILE, snapshot)?;
        log::debug!("Snapshot saved to {}", self.dir.join(SNAPSHOT_FILE).display());
        Ok(())
    }

    /// Loads pending queue items in FIFO order by creation time
    ///
    /// Items created in the same instant keep their append order.
    pub fn load_queue(&self) -> StoreResult<Vec<OfflineQueueItem>> {
        let _guard = self.guard()?;
        self.load_queue_locked()
    }

    /// Appends a mutation to the end of the queue
    pub fn append_queue(&self, item: &OfflineQueueItem) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut items = self.load_queue_locked()?;
        items.push(item.clone());
        self.write_json(QUEUE_FILE, &items)
    }

    /// Replaces a queue item in place (used for attempt bumps)
    pub fn update_queue_item(&self, item: &OfflineQueueItem) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut items = self.load_queue_locked()?;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item.clone(),
            None => {
                log::warn!("Queue item {} not found during update", item.id);
                return Ok(());
            }
        }
        self.write_json(QUEUE_FILE, &items)
    }

    /// Removes a delivered queue item by id
    pub fn remove_queue_item(&self, id: &str) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut items = self.load_queue_locked()?;
        items.retain(|item| item.id != id);
        self.write_json(QUEUE_FILE, &items)
    }

    /// Loads the dead-letter set
    pub fn load_dead_letters(&self) -> StoreResult<Vec<OfflineQueueItem>> {
        let _guard = self.guard()?;
        Ok(self.read_json(DEAD_LETTER_FILE)?.unwrap_or_default())
    }

    /// Moves an item into the dead-letter set
    pub fn append_dead_letter(&self, item: &OfflineQueueItem) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut items: Vec<OfflineQueueItem> =
            self.read_json(DEAD_LETTER_FILE)?.unwrap_or_default();
        items.push(item.clone());
        self.write_json(DEAD_LETTER_FILE, &items)
    }

    /// Loads sync metadata, defaulting when none was saved yet
    pub fn load_metadata(&self) -> StoreResult<SyncMetadata> {
        let _guard = self.guard()?;
        Ok(self.read_json(METADATA_FILE)?.unwrap_or_default())
    }

    /// Persists sync metadata atomically
    pub fn save_metadata(&self, metadata: &SyncMetadata) -> StoreResult<()> {
        let _guard = self.guard()?;
        self.write_json(METADATA_FILE, metadata)
    }

    /// Wipes the whole namespace (logout)
    pub fn reset(&self) -> StoreResult<()> {
        let _guard = self.guard()?;
        for name in [SNAPSHOT_FILE, QUEUE_FILE, DEAD_LETTER_FILE, METADATA_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                fs::remove_file(&path).map_err(|e| StoreError::Write { path, source: e })?;
            }
        }
        log::info!("Local store reset at {}", self.dir.display());
        Ok(())
    }

    fn guard(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn load_queue_locked(&self) -> StoreResult<Vec<OfflineQueueItem>> {
        let mut items: Vec<OfflineQueueItem> = self.read_json(QUEUE_FILE)?.unwrap_or_default();
        // Stable sort: equal timestamps keep append order
        items.sort_by_key(|item| item.created_at);
        Ok(items)
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> StoreResult<Option<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| StoreError::Read {
            path: path.clone(),
            source: e,
        })?;

        // An empty file is corruption, not an empty value
        if contents.trim().is_empty() {
            return Err(StoreError::Read {
                path,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "file is empty or contains only whitespace",
                ),
            });
        }

        let value = serde_json::from_str(&contents).map_err(|e| StoreError::Parse {
            path,
            source: e,
        })?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> StoreResult<()> {
        self.ensure_dir_exists()?;

        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value).map_err(StoreError::Serialize)?;

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;
        temp.write_all(json.as_bytes()).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;
        temp.flush().map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;
        temp.persist(&path).map_err(|e| StoreError::Write {
            path,
            source: e.error,
        })?;

        Ok(())
    }

    fn ensure_dir_exists(&self) -> StoreResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| StoreError::DirectoryCreation {
                path: self.dir.clone(),
                source: e,
            })?;
            log::info!("Created data directory: {}", self.dir.display());
        }
        Ok(())
    }
}
