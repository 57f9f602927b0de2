//! JSON-file backed key-value store.

use crate::{KeyValueStore, StorageError, StorageResult};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

/// Key-value store persisted as a flat JSON object in a single file.
///
/// The whole map is rewritten on every `set`/`delete`; the store holds a
/// handful of small string slots, so this stays cheap. Writes go through a
/// temp file followed by a rename so a crash mid-write never corrupts the
/// slot file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the given file. The file and its parent
    /// directory are created lazily on first write.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn load_map(&self) -> StorageResult<Map<String, Value>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => {
                let value: Value = serde_json::from_str(&content)
                    .map_err(|e| StorageError::Encoding(e.to_string()))?;
                match value {
                    Value::Object(map) => Ok(map),
                    other => Err(StorageError::Encoding(format!(
                        "expected JSON object at top level, found {other}"
                    ))),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store_map(&self, map: &Map<String, Value>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        let content = serde_json::to_string_pretty(&Value::Object(map.clone()))
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.load_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.store_map(&map)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        let map = self.load_map()?;
        match map.get(key) {
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(StorageError::Encoding(format!(
                "slot {key} holds a non-string value: {other}"
            ))),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock();
        let mut map = self.load_map()?;
        let existed = map.remove(key).is_some();
        if existed {
            self.store_map(&map)?;
        }
        Ok(existed)
    }
}
