//! Local Persistence
//!
//! Key-value storage for the player's progress so a restart on the same
//! device resumes where it left off. Everything here degrades gracefully:
//! a missing or unreadable entry means "not registered yet".

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::game::answers::AnswerSet;
use crate::game::player::PlayerId;

/// Fixed storage key for the player's progress.
pub const PROGRESS_KEY: &str = "mile-game-storage";

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key contains characters unusable as a file name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Filesystem error.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be (de)serialized.
    #[error("Storage encoding error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String key-value store.
pub trait KeyValueStore {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// BACKENDS
// =============================================================================

/// In-memory store (tests, or when no directory is usable).
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// PROGRESS
// =============================================================================

/// What survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Registered name.
    #[serde(default)]
    pub player_name: String,
    /// Server-assigned id, once registered.
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    /// Player avatar.
    #[serde(default)]
    pub avatar: String,
    /// Last submitted answers.
    #[serde(default)]
    pub answers: AnswerSet,
    /// Last known score.
    #[serde(default)]
    pub score: u32,
    /// Whether the quiz was submitted.
    #[serde(default)]
    pub has_completed: bool,
}

impl Progress {
    /// Load progress from `store`, falling back to the empty state on any
    /// failure.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let raw = match store.get(PROGRESS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!("Could not read saved progress: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(progress) => progress,
            Err(e) => {
                warn!("Discarding unreadable saved progress: {}", e);
                Self::default()
            }
        }
    }

    /// Persist to `store`.
    pub fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.put(PROGRESS_KEY, &json)?;
        debug!("Saved progress for {:?}", self.player_id);
        Ok(())
    }

    /// Delete saved progress.
    pub fn clear(store: &mut impl KeyValueStore) -> Result<(), StorageError> {
        store.remove(PROGRESS_KEY)
    }
}
