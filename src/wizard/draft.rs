// ABOUTME: Local draft persistence for create-mode wizard sessions
// Best-effort snapshot of the entity plus wizard position, one slot per entity kind

use crate::models::{EntityDraft, EntityKind};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Failed to serialize draft: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Draft storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Durable key-value slot scoped to the local user profile
pub trait DraftStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileDraftStorage {
    dir: PathBuf,
}

impl FileDraftStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file_name}.json"))
    }
}

impl DraftStorage for FileDraftStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir)?;
        // Write to a sibling temp file first so a crash never leaves half a draft
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, optionally bounded to a total byte size
#[derive(Debug, Default)]
pub struct MemoryDraftStorage {
    slots: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryDraftStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            capacity: Some(bytes),
        }
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.slots
            .lock()
            .map_err(|_| StorageError::Unavailable("draft slots lock poisoned".to_string()))
    }
}

impl DraftStorage for MemoryDraftStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots()?;
        if let Some(capacity) = self.capacity {
            let used: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let available = capacity.saturating_sub(used);
            if value.len() > available {
                return Err(StorageError::QuotaExceeded {
                    needed: value.len(),
                    available,
                });
            }
        }
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.slots()?.remove(key);
        Ok(())
    }
}

/// Persisted wizard state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub form_data: EntityDraft,
    pub current_step: usize,
    pub completed_steps: Vec<usize>,
    /// Epoch milliseconds of the write
    pub timestamp: i64,
}

impl DraftSnapshot {
    pub fn new(form_data: EntityDraft, current_step: usize, completed_steps: &BTreeSet<usize>) -> Self {
        Self {
            form_data,
            current_step,
            completed_steps: completed_steps.iter().copied().collect(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Single-slot draft persistence for one entity kind
#[derive(Clone)]
pub struct DraftStore {
    kind: EntityKind,
    storage: Arc<dyn DraftStorage>,
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore").field("key", &self.key()).finish()
    }
}

impl DraftStore {
    pub fn new(kind: EntityKind, storage: Arc<dyn DraftStorage>) -> Self {
        Self { kind, storage }
    }

    pub fn key(&self) -> &'static str {
        self.kind.draft_key()
    }

    /// Overwrite the slot, reporting any failure
    pub fn try_persist(&self, snapshot: &DraftSnapshot) -> Result<(), DraftError> {
        let content = serde_json::to_string(snapshot)?;
        self.storage.set(self.key(), &content)?;
        debug!(
            "Persisted {} draft at step {} ({} bytes)",
            self.kind,
            snapshot.current_step,
            content.len()
        );
        Ok(())
    }

    /// Best-effort write; failures are logged and otherwise ignored
    pub fn persist(&self, snapshot: &DraftSnapshot) -> bool {
        match self.try_persist(snapshot) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not save {} draft: {}", self.kind, e);
                false
            }
        }
    }

    /// Previously stored snapshot, or `None` when absent or unreadable
    pub fn load(&self) -> Option<DraftSnapshot> {
        let content = match self.storage.get(self.key()) {
            Ok(Some(content)) => content,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read {} draft: {}", self.kind, e);
                return None;
            }
        };

        match serde_json::from_str::<DraftSnapshot>(&content) {
            Ok(snapshot) => {
                info!(
                    "Recovered {} draft at step {} (saved {})",
                    self.kind,
                    snapshot.current_step,
                    snapshot.timestamp
                );
                Some(snapshot)
            }
            Err(e) => {
                warn!("Ignoring corrupt {} draft: {}", self.kind, e);
                None
            }
        }
    }

    pub fn clear(&self) -> bool {
        match self.storage.remove(self.key()) {
            Ok(()) => {
                debug!("Cleared {} draft", self.kind);
                true
            }
            Err(e) => {
                warn!("Could not clear {} draft: {}", self.kind, e);
                false
            }
        }
    }
}
