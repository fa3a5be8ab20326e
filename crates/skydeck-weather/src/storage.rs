//! Key-value persistence for the dashboard state.
//!
//! The whole [`AppState`] is written as one JSON blob under [`STORAGE_KEY`].
//! Failures on either side are logged and swallowed: a broken store never
//! takes the dashboard down.

use crate::types::{AppState, STORAGE_KEY};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage
pub trait StateStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process storage, optionally refusing every write
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose writes always fail (quota exceeded, read-only disk...)
    pub fn read_only() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            reject_writes: true,
        }
    }

    /// Seed a raw value, bypassing serialization
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes {
            return Err(StorageError::Unavailable("storage is read-only".to_string()));
        }
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persist the full state. Returns whether the write went through.
pub fn save_state(storage: &dyn StateStorage, state: &AppState) -> bool {
    let result = serde_json::to_string(state)
        .map_err(StorageError::from)
        .and_then(|json| storage.write(STORAGE_KEY, &json));

    match result {
        Ok(()) => {
            tracing::debug!("Saved {} locations", state.locations.len());
            true
        }
        Err(e) => {
            tracing::error!("Failed to save state: {}", e);
            false
        }
    }
}

/// Read the persisted state. Missing, unreadable and malformed blobs all
/// yield `None`.
pub fn load_state(storage: &dyn StateStorage) -> Option<AppState> {
    let raw = match storage.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!("Failed to read saved state: {}", e);
            return None;
        }
    };

    match serde_json::from_str::<AppState>(&raw) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::error!("Failed to parse saved state: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities;
    use crate::types::Location;

    fn sample_state() -> AppState {
        let mut locations = vec![Location::current(55.0, 37.0, Some("Moscow".into()), None)];
        locations.extend(cities::CITY_LIST.iter().take(2).map(Location::from_city));
        AppState { locations }
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        let state = sample_state();

        assert!(save_state(&storage, &state));
        assert_eq!(load_state(&storage), Some(state));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        let state = sample_state();

        assert!(save_state(&storage, &state));
        assert!(storage.path_for(STORAGE_KEY).exists());
        assert_eq!(load_state(&storage), Some(state));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(load_state(&storage), None);
    }

    #[test]
    fn test_malformed_blob_is_none() {
        let storage = MemoryStorage::new();
        storage.insert_raw(STORAGE_KEY, "{ not json");
        assert_eq!(load_state(&storage), None);
    }

    #[test]
    fn test_browser_era_blob_shape_is_accepted() {
        let storage = MemoryStorage::new();
        storage.insert_raw(
            STORAGE_KEY,
            r#"{"locations":[{"id":"current","isCurrent":true,"lat":1.5,"lon":2.5,
                "cityName":null,"country":null,"displayName":"My location"}]}"#,
        );

        let state = load_state(&storage).unwrap();
        assert_eq!(state.locations.len(), 1);
        assert!(state.locations[0].is_current);
    }

    #[test]
    fn test_write_failure_is_reported_not_raised() {
        let storage = MemoryStorage::read_only();
        assert!(!save_state(&storage, &sample_state()));
        assert_eq!(load_state(&storage), None);
    }
}
