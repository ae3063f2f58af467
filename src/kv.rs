//! Persistent key-value store adapter
//!
//! Wraps a synchronous byte store with JSON encoding. Every failure of the
//! underlying medium is contained here: `set`/`remove` report `false`, `get`
//! hands back the caller's default. Nothing above this layer sees a storage
//! error.
//!
//! # Layout
//!
//! ```text
//! <data-dir>/store/
//!   studyflow_tasks.json        # JSON array of every task
//!   studyflow_theme.json        # "light" | "dark"
//!   studyflow_timer.json        # Pomodoro state
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// Name of the store directory inside the data directory
pub const STORE_DIR: &str = "store";

/// Raw storage medium behind the adapter
pub trait KvBackend: fmt::Debug {
    /// Read the raw value for `key`, `None` when absent
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the raw value for `key`
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting a missing key succeeds
    fn delete(&self, key: &str) -> Result<()>;
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    /// Store directory for a data directory
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STORE_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that holds `key`
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        lock::read_locked(self.key_path(key), self.lock_timeout_ms)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        lock::write_atomic_locked(self.key_path(key), value.as_bytes(), self.lock_timeout_ms)
    }

    fn delete(&self, key: &str) -> Result<()> {
        lock::remove_locked(self.key_path(key), self.lock_timeout_ms)
    }
}

/// In-process backend
///
/// `set_failing(true)` makes every call fail, which simulates a full or
/// disabled medium.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RefCell<BTreeMap<String, String>>,
    failing: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Raw stored value, bypassing the adapter
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Overwrite a raw value, bypassing the adapter
    pub fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn check(&self) -> Result<()> {
        if self.failing.get() {
            return Err(Error::OperationFailed(
                "storage quota exceeded".to_string(),
            ));
        }
        Ok(())
    }
}

impl KvBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.put_raw(key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<B: KvBackend + ?Sized> KvBackend for std::rc::Rc<B> {
    fn read(&self, key: &str) -> Result<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

/// JSON key-value store with namespaced keys and contained failures
#[derive(Debug)]
pub struct KvStore {
    backend: Box<dyn KvBackend>,
    prefix: String,
}

impl KvStore {
    pub fn new(backend: impl KvBackend + 'static, prefix: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            prefix: prefix.into(),
        }
    }

    /// Physical key for a logical key
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Encode `value` as JSON and store it under `key`
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let full_key = self.namespaced(key);
        let encoded = match serde_json::to_string_pretty(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "storage encode failed");
                return false;
            }
        };
        match self.backend.write(&full_key, &encoded) {
            Ok(()) => {
                tracing::debug!(key = %full_key, bytes = encoded.len(), "stored value");
                true
            }
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "storage write failed");
                false
            }
        }
    }

    /// Decode the value under `key`, or return `default` when it is missing,
    /// unreadable, or not valid JSON for `T`
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let full_key = self.namespaced(key);
        let raw = match self.backend.read(&full_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "storage read failed");
                return default;
            }
        };
        if raw.trim().is_empty() {
            return default;
        }
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "stored value is corrupt");
                default
            }
        }
    }

    /// Delete `key`
    pub fn remove(&self, key: &str) -> bool {
        let full_key = self.namespaced(key);
        match self.backend.delete(&full_key) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(key = %full_key, error = %err, "storage delete failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn get_missing_returns_default() {
        let store = KvStore::new(MemoryBackend::new(), "studyflow_");
        let tasks: Vec<Sample> = store.get("tasks", Vec::new());
        assert!(tasks.is_empty());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let store = KvStore::new(MemoryBackend::new(), "studyflow_");
        let value = Sample {
            name: "chapter".to_string(),
            count: 3,
        };
        assert!(store.set("sample", &value));
        let loaded: Option<Sample> = store.get("sample", None);
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn keys_are_prefixed() {
        let backend = Rc::new(MemoryBackend::new());
        let store = KvStore::new(Rc::clone(&backend), "studyflow_");
        assert!(store.set("theme", "dark"));
        assert_eq!(backend.raw("studyflow_theme").as_deref(), Some("\"dark\""));
        assert!(backend.raw("theme").is_none());
    }

    #[test]
    fn corrupt_value_returns_default() {
        let backend = Rc::new(MemoryBackend::new());
        let store = KvStore::new(Rc::clone(&backend), "p_");
        backend.put_raw("p_tasks", "{not json");
        let value: Vec<Sample> = store.get("tasks", Vec::new());
        assert!(value.is_empty());

        backend.put_raw("p_tasks", "{\"name\": 1}");
        let value: Vec<Sample> = store.get("tasks", Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn failing_backend_is_contained() {
        let backend = Rc::new(MemoryBackend::new());
        let store = KvStore::new(Rc::clone(&backend), "p_");
        assert!(store.set("count", &1u32));

        backend.set_failing(true);
        assert!(!store.set("count", &2u32));
        assert_eq!(store.get("count", 7u32), 7);
        assert!(!store.remove("count"));

        backend.set_failing(false);
        assert_eq!(store.get("count", 0u32), 1);
    }

    #[test]
    fn remove_missing_key_succeeds() {
        let store = KvStore::new(MemoryBackend::new(), "p_");
        assert!(store.remove("nothing"));
    }

    #[test]
    fn file_backend_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let store = KvStore::new(FileBackend::in_data_dir(temp_dir.path()), "studyflow_");
        assert!(store.set("theme", "dark"));

        let path = temp_dir.path().join(STORE_DIR).join("studyflow_theme.json");
        assert!(path.exists());

        let reopened = KvStore::new(FileBackend::in_data_dir(temp_dir.path()), "studyflow_");
        assert_eq!(reopened.get("theme", "light".to_string()), "dark");

        assert!(reopened.remove("theme"));
        assert!(!path.exists());
        assert_eq!(reopened.get("theme", "light".to_string()), "light");
    }

    #[test]
    fn file_backend_unwritable_dir_is_contained() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        // The store directory path is occupied by a regular file.
        let store = KvStore::new(FileBackend::new(&blocker), "p_");
        assert!(!store.set("tasks", &Vec::<Sample>::new()));
        let value: Vec<Sample> = store.get("tasks", Vec::new());
        assert!(value.is_empty());
    }
}
