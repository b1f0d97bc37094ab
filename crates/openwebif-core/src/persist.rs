// ── Durable key-value persistence ──
//
// The bridge persists two small JSON documents per device: the channel
// list fetched from the box (best-effort cache) and the user's rename
// map. Both go through this narrow store interface so callers decide
// what a write failure means.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A durable key-value store scoped to one device.
///
/// Writes are last-write-wins with no transactional guarantee; the two
/// documents the bridge stores are tiny and rewritten in full.
pub trait PersistenceStore: Send + Sync {
    /// Read the value for `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write (or overwrite) the value for `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;

    /// Ensure previous writes have reached durable storage.
    fn flush(&self) -> Result<(), PersistError>;
}

/// File-backed store: one file per key under a per-device directory.
///
/// File names carry a device tag derived from the host so several boxes
/// can share one storage directory.
pub struct JsonFileStore {
    dir: PathBuf,
    tag: String,
}

impl JsonFileStore {
    /// Create a store under `dir` for the device at `host`.
    ///
    /// The directory is created if missing.
    pub fn for_device(dir: impl Into<PathBuf>, host: &str) -> Result<Self, PersistError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            tag: host.replace(['.', ':'], ""),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}_{}", self.tag))
    }

    /// The directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        std::fs::write(self.path(key), value)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), PersistError> {
        Ok(())
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self
            .map
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.map
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn flush(&self) -> Result<(), PersistError> {
        Ok(())
    }
}
