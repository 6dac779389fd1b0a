//! Local persisted state
//!
//! A small key/value store standing in for browser local storage. Every
//! caller treats it as best-effort: failures are logged and read back as
//! absent values.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{BlogError, BlogResult};

/// String key/value storage
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> BlogResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> BlogResult<()>;
    fn remove_item(&self, key: &str) -> BlogResult<()>;
}

/// Read a key, treating any failure as absent
pub fn read_best_effort(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Failed to read {} from storage: {}", key, e);
            None
        }
    }
}

/// Write a key, logging and swallowing failures
pub fn write_best_effort(storage: &dyn Storage, key: &str, value: &str) {
    if let Err(e) = storage.set_item(key, value) {
        tracing::warn!("Failed to save {} to storage: {}", key, e);
    }
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> BlogResult<Option<String>> {
        let items = self.items.lock().map_err(|_| poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> BlogResult<()> {
        let mut items = self.items.lock().map_err(|_| poisoned())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> BlogResult<()> {
        let mut items = self.items.lock().map_err(|_| poisoned())?;
        items.remove(key);
        Ok(())
    }
}

/// Storage that rejects every operation, like a browser with storage disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStorage;

impl Storage for DisabledStorage {
    fn get_item(&self, _key: &str) -> BlogResult<Option<String>> {
        Err(BlogError::Storage("storage is disabled".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> BlogResult<()> {
        Err(BlogError::Storage("storage is disabled".to_string()))
    }

    fn remove_item(&self, _key: &str) -> BlogResult<()> {
        Err(BlogError::Storage("storage is disabled".to_string()))
    }
}

/// Storage backed by a single JSON object file
///
/// The file is re-read on every access so separate processes (the CLI and a
/// running server) see each other's writes.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> BlogResult<Map<String, Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(BlogError::Storage(e.to_string())),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!("Ignoring malformed storage file {:?}", self.path);
                Ok(Map::new())
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> BlogResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| BlogError::Storage(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(map)
            .map_err(|e| BlogError::Storage(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| BlogError::Storage(e.to_string()))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> BlogResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let map = self.read_map()?;
        Ok(map.get(key).and_then(|v| v.as_str()).map(str::to_string))
    }

    fn set_item(&self, key: &str, value: &str) -> BlogResult<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> BlogResult<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

fn poisoned() -> BlogError {
    BlogError::Storage("storage lock poisoned".to_string())
}
