//! Undo bookkeeping.
//!
//! One record is kept: the pre-mutation snapshots of the last batch that had
//! at least one success. A new successful batch overwrites it and a single
//! undo consumes it. There is no redo stack.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BulkError, BulkResult};
use crate::event::ResourceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndoAction {
    Delete,
    Move,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRecord {
    /// Pre-mutation state of every successfully mutated event.
    pub snapshots: Vec<ResourceSnapshot>,
    pub action: UndoAction,
    /// Minutes applied by a move; `None` for deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl UndoRecord {
    pub fn deleted(snapshots: Vec<ResourceSnapshot>) -> Self {
        UndoRecord {
            snapshots,
            action: UndoAction::Delete,
            delta: None,
            created_at: Utc::now(),
        }
    }

    pub fn moved(snapshots: Vec<ResourceSnapshot>, delta: i64) -> Self {
        UndoRecord {
            snapshots,
            action: UndoAction::Move,
            delta: Some(delta),
            created_at: Utc::now(),
        }
    }
}

pub trait UndoStore: Send + Sync {
    fn save(&self, record: &UndoRecord) -> BulkResult<()>;
    fn load(&self) -> BulkResult<Option<UndoRecord>>;
    fn clear(&self) -> BulkResult<()>;
}

/// Keeps the record in a JSON file so it survives process restarts.
#[derive(Debug, Clone)]
pub struct FileUndoStore {
    path: PathBuf,
}

impl FileUndoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileUndoStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UndoStore for FileUndoStore {
    fn save(&self, record: &UndoRecord) -> BulkResult<()> {
        let contents = serde_json::to_string_pretty(record)
            .map_err(|e| BulkError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BulkError::UndoStore(format!("Could not create {}: {e}", parent.display()))
            })?;
        }

        std::fs::write(&self.path, contents).map_err(|e| {
            BulkError::UndoStore(format!("Could not write {}: {e}", self.path.display()))
        })?;

        Ok(())
    }

    fn load(&self) -> BulkResult<Option<UndoRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let record = serde_json::from_str(&contents).map_err(|e| {
            BulkError::UndoStore(format!("Could not parse {}: {e}", self.path.display()))
        })?;

        Ok(Some(record))
    }

    fn clear(&self) -> BulkResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryUndoStore {
    record: Mutex<Option<UndoRecord>>,
}

impl MemoryUndoStore {
    pub fn new() -> Self {
        MemoryUndoStore::default()
    }

    fn slot(&self) -> BulkResult<std::sync::MutexGuard<'_, Option<UndoRecord>>> {
        self.record
            .lock()
            .map_err(|_| BulkError::UndoStore("undo store lock poisoned".into()))
    }
}

impl UndoStore for MemoryUndoStore {
    fn save(&self, record: &UndoRecord) -> BulkResult<()> {
        *self.slot()? = Some(record.clone());
        Ok(())
    }

    fn load(&self) -> BulkResult<Option<UndoRecord>> {
        Ok(self.slot()?.clone())
    }

    fn clear(&self) -> BulkResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventBoundary, ResourceId};

    fn snapshot() -> ResourceSnapshot {
        ResourceSnapshot {
            id: ResourceId::new("evt1"),
            title: "Planning".to_string(),
            description: "Quarterly".to_string(),
            start: EventBoundary::date_time("2024-06-03T10:00:00+02:00", Some("Europe/Paris")),
            end: EventBoundary::date_time("2024-06-03T11:00:00+02:00", Some("Europe/Paris")),
        }
    }

    #[test]
    fn test_file_store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUndoStore::new(dir.path().join("nested").join("last_action.json"));

        assert_eq!(store.load().unwrap(), None);

        let record = UndoRecord::moved(vec![snapshot()], 30);
        store.save(&record).unwrap();

        let reopened = FileUndoStore::new(store.path().to_path_buf());
        assert_eq!(reopened.load().unwrap(), Some(record));

        reopened.clear().unwrap();
        assert_eq!(reopened.load().unwrap(), None);
        reopened.clear().unwrap();
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let store = MemoryUndoStore::new();
        store.save(&UndoRecord::moved(vec![snapshot()], 15)).unwrap();
        store.save(&UndoRecord::deleted(vec![snapshot()])).unwrap();

        let record = store.load().unwrap().unwrap();
        assert_eq!(record.action, UndoAction::Delete);
        assert_eq!(record.delta, None);
    }

    #[test]
    fn test_record_json_shape() {
        let record = UndoRecord::deleted(vec![snapshot()]);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["action"], "delete");
        assert!(json.get("delta").is_none());
        assert_eq!(json["snapshots"][0]["start"]["timeZone"], "Europe/Paris");
    }
}
