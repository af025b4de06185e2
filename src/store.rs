//! Persistent local storage for the best score, the player name and the
//! leaderboard.
//!
//! The store is a flat string key/value map. Reads never fail: missing or
//! malformed values fall back to defaults. Write failures are reported to the
//! caller, and `Records` logs and drops them so a full disk never interrupts a
//! round.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::StoreError;
use crate::leaderboard::{sanitize_name, Leaderboard};

pub const BEST_SCORE_KEY: &str = "best_score";
pub const PLAYER_NAME_KEY: &str = "player_name";
pub const LEADERBOARD_KEY: &str = "leaderboard";

pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ── In-memory store ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        let _ = self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.values.insert(key.to_string(), value);
        Ok(())
    }
}

// ── File store ───────────────────────────────────────────────────────────────

/// A JSON object on disk, rewritten whole on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// `$HOME/.bug_blaster.json`, or the working directory without `HOME`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".bug_blaster.json")
    }

    /// Opens the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed store {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("cannot read store {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        FileStore { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let _ = self.values.insert(key.to_string(), value);
        self.flush()
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

/// Best score, player name and leaderboard kept on top of a `Store`.
#[derive(Debug)]
pub struct Records<S: Store> {
    store: S,
    leaderboard: Leaderboard,
}

impl<S: Store> Records<S> {
    pub fn new(store: S) -> Self {
        let leaderboard = store
            .get(LEADERBOARD_KEY)
            .map(|raw| Leaderboard::parse(&raw, unix_millis()))
            .unwrap_or_default();
        Records { store, leaderboard }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn best_score(&self) -> u32 {
        self.store
            .get(BEST_SCORE_KEY)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn player_name(&self) -> String {
        self.store
            .get(PLAYER_NAME_KEY)
            .map(|raw| sanitize_name(&raw))
            .unwrap_or_default()
    }

    pub fn save_player_name(&mut self, name: &str) {
        self.put(PLAYER_NAME_KEY, sanitize_name(name));
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Record a finished round. Returns true when it set a new best score.
    pub fn submit(&mut self, name: &str, score: u32, ts: u64) -> bool {
        let new_best = score > self.best_score();
        if new_best {
            self.put(BEST_SCORE_KEY, score.to_string());
        }

        if self.leaderboard.record(name, score, ts) {
            match self.leaderboard.to_json() {
                Ok(json) => self.put(LEADERBOARD_KEY, json),
                Err(e) => tracing::warn!("cannot encode leaderboard: {e}"),
            }
        }
        new_best
    }

    fn put(&mut self, key: &str, value: String) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!("failed to persist {key}: {e}");
        }
    }
}
