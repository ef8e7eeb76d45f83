//! Result stores
//!
//! A store maps work-unit keys to records. Completed records are written
//! once; a later save for the same key leaves them untouched.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xent_runtime::{Checkpoint, Usage};

use crate::error::{Error, Result};

/// What is persisted for one work unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub game: String,
    pub player: String,
    pub seed: u64,
    pub total_score: f64,
    pub usage: Usage,
    pub checkpoint: Checkpoint,
}

impl UnitRecord {
    pub fn is_complete(&self) -> bool {
        self.checkpoint.is_complete()
    }
}

/// Persistent mapping from work-unit key to record.
pub trait ResultStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<UnitRecord>>;

    /// Store `record` unless a completed record already exists.
    ///
    /// Returns whether anything was written.
    fn save(&self, key: &str, record: &UnitRecord) -> Result<bool>;
}

/// One pretty-printed JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl ResultStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<UnitRecord>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn save(&self, key: &str, record: &UnitRecord) -> Result<bool> {
        if let Some(existing) = self.load(key)? {
            if existing.is_complete() {
                warn!(key, "completed record already stored, not overwriting");
                return Ok(false);
            }
        }
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        fs::write(&staging, json).map_err(|e| Error::io(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| Error::io(&path, e))?;
        debug!(key, path = %path.display(), complete = record.is_complete(), "record saved");
        Ok(true)
    }
}

/// In-process store for tests and one-off runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<IndexMap<String, UnitRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, record: UnitRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| Error::StorePoisoned)?
            .insert(key.into(), record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<UnitRecord>> {
        let records = self.records.lock().map_err(|_| Error::StorePoisoned)?;
        Ok(records.get(key).cloned())
    }

    fn save(&self, key: &str, record: &UnitRecord) -> Result<bool> {
        let mut records = self.records.lock().map_err(|_| Error::StorePoisoned)?;
        if records.get(key).is_some_and(UnitRecord::is_complete) {
            return Ok(false);
        }
        records.insert(key.to_string(), record.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xent_runtime::{Event, RoundResult};

    fn completed(score: f64) -> UnitRecord {
        UnitRecord {
            game: "g".into(),
            player: "p".into(),
            seed: 1,
            total_score: score,
            usage: Usage::default(),
            checkpoint: Checkpoint::Results(vec![RoundResult {
                round: 0,
                score,
                usage: Usage::default(),
                history: vec![
                    Event::RoundStarted { round: 0 },
                    Event::RoundFinished { round: 0, score },
                ],
            }]),
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("results")).unwrap();
        assert!(store.load("g__p__1").unwrap().is_none());

        let record = completed(2.5);
        assert!(store.save("g__p__1", &record).unwrap());
        assert_eq!(store.load("g__p__1").unwrap(), Some(record));

        let json = fs::read_to_string(store.path_for("g__p__1")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["checkpoint"]["results"].is_array());
        assert_eq!(value["game"], "g");
    }

    #[test]
    fn test_completed_records_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let file_store = FileStore::new(dir.path()).unwrap();
        let memory_store = MemoryStore::new();

        for store in [&file_store as &dyn ResultStore, &memory_store] {
            assert!(store.save("k", &completed(1.0)).unwrap());
            assert!(!store.save("k", &completed(9.0)).unwrap());
            assert_eq!(store.load("k").unwrap().unwrap().total_score, 1.0);
        }
    }
}
