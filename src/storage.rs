//! Durable key-value persistence for the high score.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{info, warn};

use crate::error::StorageError;

pub const HIGH_SCORE_KEY: &str = "halloweenHighScore";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One store shared by the menu and the running engine.
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

pub fn shared<S: KeyValueStore + 'static>(store: S) -> SharedStore {
    Rc::new(RefCell::new(store))
}

// ── Backends ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

pub fn default_store_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".haunted_run_scores.json")
}

impl FileStore {
    /// Open the store; a missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "discarding corrupt score file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        FileStore { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// Only a value that reached the file is visible through `get`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&next)?;
        std::fs::write(&self.path, text)?;
        self.entries = next;
        Ok(())
    }
}

// ── High score ────────────────────────────────────────────────────────────────

/// Stored high score; absent or non-numeric values read as zero.
pub fn load_high_score(store: &dyn KeyValueStore) -> u32 {
    match store.get(HIGH_SCORE_KEY) {
        None => 0,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = %raw, "stored high score is not a number, treating as 0");
            0
        }),
    }
}

/// Persist `score` if it beats the stored value. Returns whether it did.
pub fn record_high_score(store: &mut dyn KeyValueStore, score: u32) -> bool {
    if score <= load_high_score(store) {
        return false;
    }
    match store.set(HIGH_SCORE_KEY, &score.to_string()) {
        Ok(()) => {
            info!(score, "new high score saved");
            true
        }
        Err(e) => {
            warn!(error = %e, "could not save high score");
            false
        }
    }
}
